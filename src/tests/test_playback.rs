use nalgebra::Point3;

use crate::chain::Direction;
use crate::control_loop::Intent;
use crate::settings::ControlSettings;
use crate::skeleton::Skeleton;
use crate::teach::ModeKind;
use crate::tests::test_utils::{control_loop, idle_frames, positions_close, run_script};

const SMALL: f64 = 1e-9;

/// Reaches every target in the frame it is set.
fn snappy() -> ControlSettings {
    ControlSettings { lerp_factor: 1.0, ..Default::default() }
}

fn set(index: usize, value: f64) -> Intent {
    Intent::SetTarget { index, value }
}

#[test]
fn test_playback_visits_snapshots_in_order() {
    let mut control = control_loop(&Skeleton::two_segment(), snappy());
    let s1 = vec![30.0, 0.0, 0.0, 0.2];
    let s2 = vec![30.0, 45.0, 0.0, 0.2];
    let s3 = vec![-20.0, 45.0, 10.0, 0.1];

    run_script(&mut control, &[
        &[Intent::EnterTeach, set(1, 30.0)],
        &[Intent::Save],
        &[set(2, 45.0)],
        &[Intent::Save],
        &[set(1, -20.0), set(3, 10.0), set(4, 0.1)],
        &[Intent::Save],
        // Back to zero so that playback visibly moves the arm
        &[set(1, 0.0), set(2, 0.0), set(3, 0.0)],
    ]);
    assert_eq!(control.output().snapshot_count, 3);
    let recorded = control.mode().recorder().unwrap().snapshots().to_vec();
    for (snapshot, expected) in recorded.iter().zip([&s1, &s2, &s3]) {
        assert!(positions_close(snapshot, expected, SMALL), "Recorded {:?}", snapshot);
    }

    control.tick(&[Intent::TogglePlay]);
    assert_eq!(control.output().mode, ModeKind::Playing);
    assert_eq!(control.output().cursor, 1);
    assert!(positions_close(&control.chain().positions(), &s1, SMALL));

    let dwell = control.settings().dwell_frames as usize;
    let mut visited = vec![control.chain().positions()];
    for _ in 0..3 {
        idle_frames(&mut control, dwell - 1);
        // Still the same snapshot on the last frame of the interval
        assert_eq!(control.chain().positions(), *visited.last().unwrap());
        control.tick(&[]);
        visited.push(control.chain().positions());
    }
    for (positions, expected) in visited.iter().zip([&s1, &s2, &s3, &s1]) {
        assert!(positions_close(positions, expected, SMALL), "Visited {:?}", positions);
    }
    assert_eq!(control.output().cursor, 1);
}

#[test]
fn test_save_records_positions_not_targets() {
    let mut control = control_loop(&Skeleton::two_segment(), ControlSettings::default());
    control.tick(&[Intent::EnterTeach]);
    let before = control.chain().positions();

    // Intents run before interpolation, so the save sees the old positions
    control.tick(&[set(1, 90.0), Intent::Save]);
    let recorder = control.mode().recorder().unwrap();
    assert_eq!(recorder.snapshots(), &[before]);
    assert_eq!(control.chain().target_position(1).unwrap(), 90.0);
}

#[test]
fn test_smoothing_converges_without_overshoot() {
    let mut control = control_loop(&Skeleton::two_segment(), ControlSettings::default());
    control.tick(&[Intent::Step(Direction::Increase)]);
    let step = control.settings().steps.revolute;
    assert!((control.chain().target_position(1).unwrap() - step).abs() < SMALL);

    let mut previous = control.chain().joint_position(1).unwrap();
    assert!(previous > 0.0 && previous < step);
    let mut frames = 1;
    while control.output().moving {
        control.tick(&[]);
        let position = control.chain().joint_position(1).unwrap();
        assert!(position >= previous && position <= step);
        previous = position;
        frames += 1;
        assert!(frames < 500, "Joint never settled");
    }
    assert!(control.chain().is_settled());
    assert!((previous - step).abs() <= 0.001);
}

#[test]
fn test_settled_arm_stays_put() {
    let mut control = control_loop(&Skeleton::three_segment(), ControlSettings::default());
    control.tick(&[set(2, 40.0), set(1, 1.5)]);
    idle_frames(&mut control, 300);
    assert!(control.chain().is_settled());

    let positions = control.chain().positions();
    let transforms = control.chain().absolute_transforms().to_vec();
    let output = idle_frames(&mut control, 10);
    assert!(!output.moving);
    assert_eq!(output.transforms, transforms.as_slice());
    assert_eq!(control.chain().positions(), positions);
}

#[test]
fn test_transforms_follow_in_the_same_frame() {
    let mut control = control_loop(&Skeleton::two_segment(), snappy());
    let output = control.tick(&[set(1, 90.0)]);
    let hand = output.transforms[4] * Point3::origin();
    assert!((hand - Point3::new(0.0, 4.0, 1.0)).norm() < SMALL);
    assert_eq!(output.gripper[0], output.transforms[4]);
}

#[test]
fn test_intents_apply_in_order() {
    let mut control = control_loop(&Skeleton::two_segment(), snappy());
    control.tick(&[Intent::SelectNext, Intent::Step(Direction::Increase)]);
    assert!((control.chain().joint_position(2).unwrap() - 5.0).abs() < SMALL);
    assert_eq!(control.chain().joint_position(1).unwrap(), 0.0);

    control.tick(&[Intent::Step(Direction::Increase), Intent::SelectPrevious]);
    assert!((control.chain().joint_position(2).unwrap() - 10.0).abs() < SMALL);
    assert_eq!(control.output().selected, 1);
}

#[test]
fn test_exit_teach_discards_snapshots() {
    let mut control = control_loop(&Skeleton::two_segment(), snappy());
    run_script(&mut control, &[
        &[Intent::ToggleTeach],
        &[Intent::Save, set(1, 10.0)],
        &[Intent::Save],
    ]);
    assert_eq!(control.output().snapshot_count, 2);

    control.tick(&[Intent::ToggleTeach]);
    assert_eq!(control.output().mode, ModeKind::Idle);
    assert_eq!(control.output().snapshot_count, 0);

    control.tick(&[Intent::EnterTeach]);
    assert_eq!(control.output().mode, ModeKind::Teaching);
    assert_eq!(control.output().snapshot_count, 0);
}

#[test]
fn test_delete_drops_last_snapshot() {
    let mut control = control_loop(&Skeleton::two_segment(), snappy());
    run_script(&mut control, &[
        &[Intent::EnterTeach, set(1, 10.0)],
        &[Intent::Save, set(1, 20.0)],
        &[Intent::Save],
        &[Intent::Delete],
    ]);
    let recorder = control.mode().recorder().unwrap();
    assert_eq!(recorder.len(), 1);
    assert!((recorder.snapshots()[0][0] - 10.0).abs() < SMALL);

    // Deleting from an empty recorder does nothing
    run_script(&mut control, &[&[Intent::Delete], &[Intent::Delete]]);
    assert_eq!(control.output().snapshot_count, 0);
    assert_eq!(control.output().mode, ModeKind::Teaching);
}

#[test]
fn test_leaving_work_mode_rewinds_and_keeps_snapshots() {
    let mut control = control_loop(&Skeleton::two_segment(), snappy());
    run_script(&mut control, &[
        &[Intent::EnterTeach, set(1, 10.0)],
        &[Intent::Save, set(1, 20.0)],
        &[Intent::Save, set(1, 0.0)],
    ]);
    assert_eq!(control.output().snapshot_count, 2);

    control.tick(&[Intent::TogglePlay]);
    let dwell = control.settings().dwell_frames as usize;
    let output = idle_frames(&mut control, dwell);
    assert_eq!(output.mode, ModeKind::Playing);
    assert_eq!(output.cursor, 2);
    assert!((control.chain().joint_position(1).unwrap() - 20.0).abs() < SMALL);

    control.tick(&[Intent::TogglePlay]);
    let output = control.output();
    assert_eq!(output.mode, ModeKind::Teaching);
    assert_eq!(output.cursor, 0);
    assert_eq!(output.snapshot_count, 2);

    // Playing again starts over from the first snapshot
    control.tick(&[Intent::TogglePlay]);
    assert_eq!(control.output().cursor, 1);
    assert!((control.chain().joint_position(1).unwrap() - 10.0).abs() < SMALL);
}

#[test]
fn test_playing_rejects_motion_commands() {
    let mut control = control_loop(&Skeleton::two_segment(), snappy());
    run_script(&mut control, &[&[Intent::EnterTeach], &[Intent::TogglePlay]]);
    assert_eq!(control.output().mode, ModeKind::Playing);

    let targets = control.chain().targets();
    control.tick(&[Intent::Step(Direction::Increase), set(2, 45.0), Intent::Save, Intent::Delete]);
    assert_eq!(control.chain().targets(), targets);

    control.tick(&[Intent::SelectNext]);
    assert_eq!(control.output().selected, 2);

    // Back to teaching, motion is allowed again
    control.tick(&[Intent::TogglePlay, set(2, 45.0)]);
    assert_eq!(control.output().mode, ModeKind::Teaching);
    assert!((control.chain().joint_position(2).unwrap() - 45.0).abs() < SMALL);
}

#[test]
fn test_playing_without_snapshots_is_idle() {
    let mut control = control_loop(&Skeleton::two_segment(), snappy());
    run_script(&mut control, &[&[Intent::EnterTeach, set(1, 33.0)], &[Intent::TogglePlay]]);
    let output = idle_frames(&mut control, 200);
    assert!(!output.moving);
    assert_eq!(output.cursor, 0);
    assert!((control.chain().joint_position(1).unwrap() - 33.0).abs() < SMALL);
}

#[test]
fn test_rejected_commands_change_nothing() {
    let mut control = control_loop(&Skeleton::two_segment(), snappy());
    let targets = control.chain().targets();

    control.tick(&[
        Intent::Select(0),
        Intent::Select(9),
        set(0, 10.0),
        set(5, 10.0),
        set(1, f64::NAN),
        Intent::Save,
        Intent::Delete,
        Intent::TogglePlay,
        Intent::ExitTeach,
    ]);
    let output = control.output();
    assert_eq!(output.mode, ModeKind::Idle);
    assert_eq!(output.selected, 1);
    assert_eq!(output.snapshot_count, 0);
    assert_eq!(control.chain().targets(), targets);
    assert_eq!(control.frame(), 1);
}
