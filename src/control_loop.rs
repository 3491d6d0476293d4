//! Per-frame driver of the engine.
//!
//! One call of [ControlLoop::tick] is one rendered frame. The stages of a frame always run in the
//! order of [Stage::ORDER]:
//!
//! 1. apply the operator intents, in the order the input layer reported them,
//! 2. advance playback if in work mode,
//! 3. move joints toward their targets,
//! 4. recompute the link transforms,
//! 5. hand the transforms to the renderer (read-only from here on).
//!
//! Rejected intents never abort a frame; they are logged and skipped.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::chain::{Direction, KinematicChain};
use crate::engine_error::EngineError;
use crate::kinematic_traits::Pose;
use crate::parameter_error::ParameterError;
use crate::settings::ControlSettings;
use crate::skeleton::Skeleton;
use crate::teach::{ModeKind, TeachMode};

/// Discrete operator command for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    SelectNext,
    SelectPrevious,
    Select(usize),
    /// Step the selected joint
    Step(Direction),
    SetTarget { index: usize, value: f64 },
    EnterTeach,
    ExitTeach,
    /// Enter teach mode when idle, leave it otherwise
    ToggleTeach,
    TogglePlay,
    Save,
    Delete,
}

impl Intent {
    fn name(&self) -> &'static str {
        match self {
            Intent::SelectNext => "next",
            Intent::SelectPrevious => "prev",
            Intent::Select(_) => "select",
            Intent::Step(_) => "step",
            Intent::SetTarget { .. } => "set",
            Intent::EnterTeach => "teach on",
            Intent::ExitTeach => "teach off",
            Intent::ToggleTeach => "teach",
            Intent::TogglePlay => "play",
            Intent::Save => "save",
            Intent::Delete => "delete",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Select(index) => write!(f, "select {}", index),
            Intent::Step(Direction::Increase) => write!(f, "step +"),
            Intent::Step(Direction::Decrease) => write!(f, "step -"),
            Intent::SetTarget { index, value } => write!(f, "set {} {}", index, value),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl FromStr for Intent {
    type Err = ParameterError;

    /// Parses the textual intents used in scripts: `next`, `prev`, `select 3`, `step +`,
    /// `step -`, `set 2 45.0`, `teach on`, `teach off`, `teach`, `play`, `save`, `delete`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = || ParameterError::ParseError(format!("unknown intent '{}'", s.trim()));
        let words: Vec<&str> = s.split_whitespace().collect();

        let index = |word: &str| word.parse::<usize>().map_err(|_| parse_error());
        let intent = match words.as_slice() {
            ["next"] => Intent::SelectNext,
            ["prev"] | ["previous"] => Intent::SelectPrevious,
            ["select", i] => Intent::Select(index(i)?),
            ["step", "+"] => Intent::Step(Direction::Increase),
            ["step", "-"] => Intent::Step(Direction::Decrease),
            ["set", i, v] => Intent::SetTarget {
                index: index(i)?,
                value: v.parse::<f64>().map_err(|_| parse_error())?,
            },
            ["teach", "on"] => Intent::EnterTeach,
            ["teach", "off"] => Intent::ExitTeach,
            ["teach"] => Intent::ToggleTeach,
            ["play"] => Intent::TogglePlay,
            ["save"] => Intent::Save,
            ["delete"] => Intent::Delete,
            _ => return Err(parse_error()),
        };
        Ok(intent)
    }
}

/// Parses one script line: intents separated by `;`, anything after `#` is a comment.
pub fn parse_intents(line: &str) -> Result<Vec<Intent>, ParameterError> {
    let code = line.split('#').next().unwrap_or("");
    code.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Intent::from_str)
        .collect()
}

/// The stages of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ApplyIntents,
    AutonomousUpdate,
    Interpolate,
    RecomputeTransforms,
    RenderHandoff,
}

impl Stage {
    /// The fixed order the stages run in every frame.
    pub const ORDER: [Stage; 5] = [
        Stage::ApplyIntents,
        Stage::AutonomousUpdate,
        Stage::Interpolate,
        Stage::RecomputeTransforms,
        Stage::RenderHandoff,
    ];
}

/// What the renderer and the user interface get at the end of a frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameOutput<'a> {
    /// Number of the frame, starting at 1
    pub frame: u64,
    /// Absolute link transforms, base first
    pub transforms: &'a [Pose],
    /// Gripper anchor, left and right finger
    pub gripper: &'a [Pose],
    /// True while any joint is still approaching its target
    pub moving: bool,
    pub mode: ModeKind,
    pub selected: usize,
    pub snapshot_count: usize,
    pub cursor: usize,
}

pub struct ControlLoop {
    chain: KinematicChain,
    mode: TeachMode,
    settings: ControlSettings,
    frame: u64,
    moving: bool,
}

impl ControlLoop {
    pub fn new(chain: KinematicChain, settings: ControlSettings) -> Result<Self, ParameterError> {
        Ok(ControlLoop {
            chain,
            mode: TeachMode::Idle,
            settings: settings.validated()?,
            frame: 0,
            moving: false,
        })
    }

    /// Builds the chain from the skeleton and takes the settings that come with it.
    pub fn from_skeleton(skeleton: &Skeleton) -> Result<Self, ParameterError> {
        let chain = KinematicChain::from_skeleton(skeleton)?;
        ControlLoop::new(chain, skeleton.settings)
    }

    pub fn chain(&self) -> &KinematicChain {
        &self.chain
    }

    pub fn mode(&self) -> &TeachMode {
        &self.mode
    }

    pub fn settings(&self) -> &ControlSettings {
        &self.settings
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Runs one frame with the intents reported for it.
    pub fn tick(&mut self, intents: &[Intent]) -> FrameOutput<'_> {
        self.frame += 1;
        for stage in Stage::ORDER {
            match stage {
                Stage::ApplyIntents => self.apply_intents(intents),
                Stage::AutonomousUpdate => {
                    self.mode.advance_playback(&mut self.chain);
                }
                Stage::Interpolate => {
                    self.moving = self.chain.advance_toward_targets(self.settings.lerp_factor);
                }
                Stage::RecomputeTransforms => self.chain.recompute_transforms(),
                Stage::RenderHandoff => {}
            }
        }
        self.output()
    }

    /// The state handed to the renderer, as of the last frame.
    pub fn output(&self) -> FrameOutput<'_> {
        FrameOutput {
            frame: self.frame,
            transforms: self.chain.absolute_transforms(),
            gripper: self.chain.gripper_transforms(),
            moving: self.moving,
            mode: self.mode.kind(),
            selected: self.chain.selected(),
            snapshot_count: self.mode.snapshot_count(),
            cursor: self.mode.cursor(),
        }
    }

    fn apply_intents(&mut self, intents: &[Intent]) {
        for intent in intents {
            if let Err(e) = self.apply(intent) {
                debug!("Frame {}: intent '{}' rejected: {}", self.frame, intent, e);
            }
        }
    }

    /// Applies a single intent immediately.
    pub fn apply(&mut self, intent: &Intent) -> Result<(), EngineError> {
        let playing = self.mode.kind() == ModeKind::Playing;
        match *intent {
            Intent::SelectNext => {
                self.chain.select_next();
                Ok(())
            }
            Intent::SelectPrevious => {
                self.chain.select_previous();
                Ok(())
            }
            Intent::Select(index) => self.chain.select(index),
            Intent::Step(_) | Intent::SetTarget { .. } if playing => {
                Err(EngineError::NotAllowedInMode { command: intent.name(), mode: ModeKind::Playing })
            }
            Intent::Step(direction) => {
                let selected = self.chain.selected();
                self.chain.move_joint_discrete(selected, direction, &self.settings.steps)
            }
            Intent::SetTarget { index, value } => self.chain.update_target_position(index, value),
            Intent::EnterTeach => self.enter_teaching(),
            Intent::ExitTeach => self.mode.exit_teaching(),
            Intent::ToggleTeach => match self.mode.kind() {
                ModeKind::Idle => self.enter_teaching(),
                _ => self.mode.exit_teaching(),
            },
            Intent::TogglePlay => self.mode.toggle_playing(),
            Intent::Save => self.mode.save(&self.chain),
            Intent::Delete => self.mode.delete(),
        }
    }

    fn enter_teaching(&mut self) -> Result<(), EngineError> {
        self.mode.enter_teaching(self.chain.controllable_count(), self.settings.dwell_frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intents() {
        assert_eq!("next".parse::<Intent>().unwrap(), Intent::SelectNext);
        assert_eq!("  step + ".parse::<Intent>().unwrap(), Intent::Step(Direction::Increase));
        assert_eq!("select 3".parse::<Intent>().unwrap(), Intent::Select(3));
        assert_eq!(
            "set 2 -45.5".parse::<Intent>().unwrap(),
            Intent::SetTarget { index: 2, value: -45.5 }
        );
        assert_eq!("teach on".parse::<Intent>().unwrap(), Intent::EnterTeach);
        assert!("jump".parse::<Intent>().is_err());
        assert!("select x".parse::<Intent>().is_err());
    }

    #[test]
    fn test_parse_script_line() {
        let intents = parse_intents("teach on; step + ;save # first pose").unwrap();
        assert_eq!(intents, vec![Intent::EnterTeach, Intent::Step(Direction::Increase), Intent::Save]);
        assert!(parse_intents("   # only a comment").unwrap().is_empty());
        assert!(parse_intents("").unwrap().is_empty());
        assert!(parse_intents("save; fly").is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for intent in [
            Intent::SelectNext,
            Intent::SelectPrevious,
            Intent::Select(2),
            Intent::Step(Direction::Decrease),
            Intent::SetTarget { index: 1, value: 12.5 },
            Intent::ExitTeach,
            Intent::ToggleTeach,
            Intent::TogglePlay,
            Intent::Delete,
        ] {
            assert_eq!(intent.to_string().parse::<Intent>().unwrap(), intent);
        }
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::ORDER[0], Stage::ApplyIntents);
        assert_eq!(Stage::ORDER[4], Stage::RenderHandoff);
    }
}
