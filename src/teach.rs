//! Teach and work (playback) modes.
//!
//! The recorder only exists while teaching: [TeachMode::Idle] carries no snapshots at all, so
//! leaving teach mode always discards what was recorded. Recorder contents are only changed by
//! the transitions and commands below.
//!
//! ```text
//!            enter                  toggle
//!   Idle ─────────────▶ Teaching ◀──────────▶ Playing
//!    ▲                      │                     │
//!    └──────── exit ────────┴─────── exit ────────┘
//! ```

use std::fmt;
use std::mem;

use tracing::{debug, info};

use crate::chain::KinematicChain;
use crate::engine_error::EngineError;
use crate::kinematic_traits::Positions;

/// Name of the current mode, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Idle,
    Teaching,
    Playing,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModeKind::Idle => "idle",
            ModeKind::Teaching => "teaching",
            ModeKind::Playing => "playing",
        };
        write!(f, "{}", name)
    }
}

/// Ordered list of whole-chain snapshots plus the playback cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct TeachRecorder {
    /// Length of every snapshot, fixed at construction.
    joint_count: usize,
    snapshots: Vec<Positions>,

    /// 1-based index of the snapshot currently played, 0 when none is.
    cursor: usize,

    /// Frames elapsed in the current dwell interval.
    frame: u32,
    dwell_frames: u32,
}

impl TeachRecorder {
    /// `dwell_frames` of 0 is treated as 1.
    pub fn new(joint_count: usize, dwell_frames: u32) -> Self {
        TeachRecorder {
            joint_count,
            snapshots: Vec::new(),
            cursor: 0,
            frame: 0,
            dwell_frames: dwell_frames.max(1),
        }
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[Positions] {
        &self.snapshots
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Appends a snapshot. It must hold exactly `joint_count` values.
    pub fn save(&mut self, positions: &[f64]) -> Result<(), EngineError> {
        if positions.len() != self.joint_count {
            return Err(EngineError::SnapshotLengthMismatch {
                expected: self.joint_count,
                found: positions.len(),
            });
        }
        self.snapshots.push(positions.to_vec());
        Ok(())
    }

    /// Removes the most recent snapshot. Does nothing on an empty recorder.
    pub fn delete(&mut self) -> Option<Positions> {
        self.snapshots.pop()
    }

    /// Forgets the playback position, keeps the snapshots.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.frame = 0;
    }

    /// Advances playback by one frame. At the first frame of every dwell interval the cursor moves
    /// on cyclically through `1..=len` and the snapshot to aim for is returned.
    /// With no snapshots nothing happens.
    pub fn tick(&mut self) -> Option<&[f64]> {
        if self.snapshots.is_empty() {
            return None;
        }

        let advance = self.frame == 0;
        self.frame = (self.frame + 1) % self.dwell_frames;
        if !advance {
            return None;
        }

        // Wraps to 1 after the last; also pulls the cursor back in range after a delete
        self.cursor = self.cursor % self.snapshots.len() + 1;
        Some(&self.snapshots[self.cursor - 1])
    }
}

/// Teach/work state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TeachMode {
    #[default]
    Idle,
    Teaching(TeachRecorder),
    Playing(TeachRecorder),
}

impl TeachMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            TeachMode::Idle => ModeKind::Idle,
            TeachMode::Teaching(_) => ModeKind::Teaching,
            TeachMode::Playing(_) => ModeKind::Playing,
        }
    }

    pub fn recorder(&self) -> Option<&TeachRecorder> {
        match self {
            TeachMode::Idle => None,
            TeachMode::Teaching(recorder) | TeachMode::Playing(recorder) => Some(recorder),
        }
    }

    /// Number of recorded snapshots, 0 when idle.
    pub fn snapshot_count(&self) -> usize {
        self.recorder().map_or(0, |r| r.len())
    }

    /// Playback cursor, 0 when idle or not playing a snapshot.
    pub fn cursor(&self) -> usize {
        self.recorder().map_or(0, |r| r.cursor())
    }

    fn not_allowed(&self, command: &'static str) -> EngineError {
        EngineError::NotAllowedInMode { command, mode: self.kind() }
    }

    /// Idle → Teaching with a fresh, empty recorder.
    pub fn enter_teaching(&mut self, joint_count: usize, dwell_frames: u32) -> Result<(), EngineError> {
        match self {
            TeachMode::Idle => {
                *self = TeachMode::Teaching(TeachRecorder::new(joint_count, dwell_frames));
                info!("Teach mode on");
                Ok(())
            }
            _ => Err(self.not_allowed("enter teach")),
        }
    }

    /// Teaching or Playing → Idle. All snapshots are discarded.
    pub fn exit_teaching(&mut self) -> Result<(), EngineError> {
        match mem::take(self) {
            TeachMode::Idle => Err(self.not_allowed("exit teach")),
            TeachMode::Teaching(recorder) | TeachMode::Playing(recorder) => {
                info!("Teach mode off, {} snapshot(s) discarded", recorder.len());
                Ok(())
            }
        }
    }

    /// Teaching ⇄ Playing. Snapshots are kept either way; the cursor starts over.
    pub fn toggle_playing(&mut self) -> Result<(), EngineError> {
        match mem::take(self) {
            TeachMode::Idle => Err(self.not_allowed("toggle work mode")),
            TeachMode::Teaching(mut recorder) => {
                recorder.rewind();
                info!("Work mode on, playing {} snapshot(s)", recorder.len());
                *self = TeachMode::Playing(recorder);
                Ok(())
            }
            TeachMode::Playing(mut recorder) => {
                recorder.rewind();
                info!("Work mode off");
                *self = TeachMode::Teaching(recorder);
                Ok(())
            }
        }
    }

    /// Records the current joint positions of the chain. Teaching only.
    pub fn save(&mut self, chain: &KinematicChain) -> Result<(), EngineError> {
        match self {
            TeachMode::Teaching(recorder) => {
                recorder.save(&chain.positions())?;
                debug!("Saved snapshot {}", recorder.len());
                Ok(())
            }
            _ => Err(self.not_allowed("save")),
        }
    }

    /// Drops the most recent snapshot. Teaching only; a no-op on an empty recorder.
    pub fn delete(&mut self) -> Result<(), EngineError> {
        match self {
            TeachMode::Teaching(recorder) => {
                if recorder.delete().is_some() {
                    debug!("Deleted snapshot, {} left", recorder.len());
                }
                Ok(())
            }
            _ => Err(self.not_allowed("delete")),
        }
    }

    /// Playback step for one frame: pushes the snapshot due in this frame, if any, into the
    /// joint targets. Returns true if targets were changed.
    pub fn advance_playback(&mut self, chain: &mut KinematicChain) -> bool {
        let TeachMode::Playing(recorder) = self else {
            return false;
        };
        let Some(snapshot) = recorder.tick() else {
            return false;
        };
        match chain.set_targets(snapshot) {
            Ok(()) => {
                debug!("Playing snapshot {}", recorder.cursor());
                true
            }
            Err(e) => {
                debug!("Snapshot {} not applied: {}", recorder.cursor(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_delete() {
        let mut recorder = TeachRecorder::new(3, 60);
        recorder.save(&[1.0, 2.0, 3.0]).unwrap();
        recorder.save(&[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.delete(), Some(vec![4.0, 5.0, 6.0]));
        assert_eq!(recorder.snapshots(), &[vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn test_delete_on_empty_is_noop() {
        let mut recorder = TeachRecorder::new(3, 60);
        assert_eq!(recorder.delete(), None);
        assert_eq!(recorder.len(), 0);
    }

    #[test]
    fn test_snapshot_length_enforced() {
        let mut recorder = TeachRecorder::new(3, 60);
        assert!(recorder.save(&[1.0, 2.0]).is_err());
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_tick_cycles_with_dwell() {
        let mut recorder = TeachRecorder::new(1, 3);
        recorder.save(&[10.0]).unwrap();
        recorder.save(&[20.0]).unwrap();

        let mut pushed = Vec::new();
        for _ in 0..12 {
            pushed.push(recorder.tick().map(|s| s[0]));
        }
        assert_eq!(pushed, vec![
            Some(10.0), None, None,
            Some(20.0), None, None,
            Some(10.0), None, None,
            Some(20.0), None, None,
        ]);
    }

    #[test]
    fn test_tick_on_empty() {
        let mut recorder = TeachRecorder::new(1, 3);
        for _ in 0..10 {
            assert!(recorder.tick().is_none());
        }
        assert_eq!(recorder.cursor(), 0);
    }

    #[test]
    fn test_cursor_pulled_back_after_delete() {
        let mut recorder = TeachRecorder::new(1, 1);
        recorder.save(&[1.0]).unwrap();
        recorder.save(&[2.0]).unwrap();
        recorder.tick();
        recorder.tick();
        assert_eq!(recorder.cursor(), 2);
        recorder.delete();
        assert_eq!(recorder.tick(), Some(&[1.0][..]));
        assert_eq!(recorder.cursor(), 1);
    }

    #[test]
    fn test_mode_transitions() {
        let mut mode = TeachMode::default();
        assert_eq!(mode.kind(), ModeKind::Idle);
        assert!(mode.toggle_playing().is_err());
        assert!(mode.exit_teaching().is_err());
        assert_eq!(mode.kind(), ModeKind::Idle);

        mode.enter_teaching(2, 60).unwrap();
        assert_eq!(mode.kind(), ModeKind::Teaching);
        assert!(mode.enter_teaching(2, 60).is_err());

        mode.toggle_playing().unwrap();
        assert_eq!(mode.kind(), ModeKind::Playing);
        mode.toggle_playing().unwrap();
        assert_eq!(mode.kind(), ModeKind::Teaching);

        mode.exit_teaching().unwrap();
        assert_eq!(mode, TeachMode::Idle);
    }

    #[test]
    fn test_delete_only_while_teaching() {
        let mut mode = TeachMode::default();
        assert!(mode.delete().is_err());
        mode.enter_teaching(2, 60).unwrap();
        assert!(mode.delete().is_ok());
        mode.toggle_playing().unwrap();
        assert!(mode.delete().is_err());
    }
}
