//! Provides visualization window with the arm, keyboard control and an egui control panel.
//!
//! The arm is drawn with gizmo lines: one segment between consecutive link origins, a small
//! coordinate frame at every link (longer at the selected joint) and the two gripper fingers.
//! One control loop frame is run per rendered frame.
//!
//! ```no_run
//! use rs_dh_arm::skeleton_presets::RobotPreset;
//! use rs_dh_arm::visualization;
//!
//! visualization::visualize_robot(RobotPreset::Three.skeleton(), Some(RobotPreset::Three)).unwrap();
//! ```
//!
//! ### Keyboard
//! - **Left / Right**: select the previous / next joint
//! - **Up / Down**: step the selected joint
//! - **T**: teach mode on or off
//! - **S**: save a snapshot, **D**: delete the last one
//! - **P**: work mode (playback) on or off
//!
//! The mouse rotates (left drag), pans (both buttons) and zooms (wheel) the camera.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};
use tracing::{info, warn};

use crate::camera_controller::{camera_controller_system, CameraController};
use crate::chain::Direction;
use crate::control_loop::{ControlLoop, Intent};
use crate::gripper::{G_ANCHOR, G_LEFT, G_RIGHT};
use crate::joint::JointType;
use crate::kinematic_traits::Pose;
use crate::parameter_error::ParameterError;
use crate::skeleton::Skeleton;
use crate::skeleton_presets::RobotPreset;
use crate::teach::ModeKind;

/// Range of revolute sliders in degrees. Only the panel is limited, the engine is not.
const REVOLUTE_SLIDER_RANGE: std::ops::RangeInclusive<f64> = -170.0..=170.0;
const PRISMATIC_SLIDER_RANGE: std::ops::RangeInclusive<f64> = 0.0..=3.0;

const AXIS_LENGTH: f32 = 0.3;
const SELECTED_AXIS_LENGTH: f32 = 0.8;

/// The engine and what the panel shows about it
#[derive(Resource)]
struct Arm {
    control: ControlLoop,
    /// None when the skeleton was not one of the built-in robots
    preset: Option<RobotPreset>,
}

/// Intents collected by the input systems for the next frame, in arrival order
#[derive(Resource, Default)]
struct PendingIntents(Vec<Intent>);

/// Visualize the arm built from the given skeleton. If `preset` is given, the panel shows it as
/// the selected robot type. Switching the type in the panel rebuilds the arm from the preset.
pub fn visualize_robot(skeleton: Skeleton, preset: Option<RobotPreset>) -> Result<(), ParameterError> {
    let control = ControlLoop::from_skeleton(&skeleton)?;
    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "rs-dh-arm".to_string(),
                    ..default()
                }),
                ..default()
            })
            // The binary installs its own tracing subscriber
            .disable::<bevy::log::LogPlugin>(),
            EguiPlugin,
        ))
        .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.12)))
        .insert_resource(Arm { control, preset })
        .init_resource::<PendingIntents>()
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (camera_controller_system, keyboard_input, control_panel, run_frame, draw_arm).chain(),
        )
        .run();
    Ok(())
}

fn setup(mut commands: Commands) {
    let controller = CameraController::default();
    commands.spawn((
        Camera3dBundle {
            transform: controller.transform(),
            ..default()
        },
        controller,
    ));
}

fn keyboard_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut pending: ResMut<PendingIntents>,
    mut egui_contexts: EguiContexts,
) {
    if egui_contexts.ctx_mut().wants_keyboard_input() {
        return;
    }
    let bindings = [
        (KeyCode::ArrowRight, Intent::SelectNext),
        (KeyCode::ArrowLeft, Intent::SelectPrevious),
        (KeyCode::ArrowUp, Intent::Step(Direction::Increase)),
        (KeyCode::ArrowDown, Intent::Step(Direction::Decrease)),
        (KeyCode::KeyT, Intent::ToggleTeach),
        (KeyCode::KeyS, Intent::Save),
        (KeyCode::KeyD, Intent::Delete),
        (KeyCode::KeyP, Intent::TogglePlay),
    ];
    for (key, intent) in bindings {
        if keys.just_pressed(key) {
            pending.0.push(intent);
        }
    }
}

fn control_panel(
    mut egui_contexts: EguiContexts,
    mut arm: ResMut<Arm>,
    mut pending: ResMut<PendingIntents>,
) {
    let mut intents = Vec::new();
    let mut switch_to = arm.preset;
    let output = arm.control.output();
    let chain = arm.control.chain();

    egui::Window::new("Robot Controls").show(egui_contexts.ctx_mut(), |ui| {
        egui::ComboBox::from_label("Robot type")
            .selected_text(switch_to.map_or("custom", |p| p.name()))
            .show_ui(ui, |ui| {
                for preset in RobotPreset::ALL {
                    ui.selectable_value(&mut switch_to, Some(preset), preset.name());
                }
            });

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let teaching = output.mode != ModeKind::Idle;
            if ui.button(if teaching { "Teach off" } else { "Teach on" }).clicked() {
                intents.push(if teaching { Intent::ExitTeach } else { Intent::EnterTeach });
            }
            if ui.add_enabled(output.mode == ModeKind::Teaching, egui::Button::new("Save")).clicked() {
                intents.push(Intent::Save);
            }
            if ui.add_enabled(output.mode == ModeKind::Teaching, egui::Button::new("Delete")).clicked() {
                intents.push(Intent::Delete);
            }
            let playing = output.mode == ModeKind::Playing;
            if ui.add_enabled(teaching, egui::Button::new(if playing { "Stop work" } else { "Work" }))
                .clicked()
            {
                intents.push(Intent::TogglePlay);
            }
        });
        ui.label(format!(
            "Mode: {}, snapshots: {}, playing: {}",
            output.mode, output.snapshot_count, output.cursor
        ));

        ui.add_space(10.0);
        ui.label("Joint targets");
        for joint_index in 1..chain.bone_count() {
            let (Ok(joint), Ok(target)) = (chain.joint(joint_index), chain.target_position(joint_index))
            else {
                continue;
            };
            let range = match joint.joint_type() {
                JointType::Prismatic => PRISMATIC_SLIDER_RANGE,
                JointType::Manipulator => 0.0..=joint.gripper().map_or(1.0, |g| g.offset()),
                _ => REVOLUTE_SLIDER_RANGE,
            };
            let mut value = target.clamp(*range.start(), *range.end());
            let marker = if joint_index == output.selected { "▶ " } else { "" };
            let slider = egui::Slider::new(&mut value, range)
                .text(format!("{}{} ({})", marker, joint.name(), joint.joint_type()));
            if ui.add_enabled(output.mode != ModeKind::Playing, slider).changed() {
                intents.push(Intent::Select(joint_index));
                intents.push(Intent::SetTarget { index: joint_index, value });
            }
        }
    });

    if switch_to != arm.preset {
        if let Some(preset) = switch_to {
            match ControlLoop::from_skeleton(&preset.skeleton()) {
                Ok(control) => {
                    info!("Switched to robot type {}", preset);
                    arm.control = control;
                    arm.preset = Some(preset);
                    pending.0.clear();
                    return;
                }
                Err(e) => warn!("Cannot build robot type {}: {}", preset, e),
            }
        }
    }
    pending.0.extend(intents);
}

fn run_frame(mut arm: ResMut<Arm>, mut pending: ResMut<PendingIntents>) {
    let intents = std::mem::take(&mut pending.0);
    arm.control.tick(&intents);
}

fn as_bevy(pose: &Pose) -> (Vec3, [Vec3; 3]) {
    let t = pose.translation.vector;
    let axis = |v: nalgebra::Vector3<f64>| {
        let a = pose.rotation * v;
        Vec3::new(a.x as f32, a.y as f32, a.z as f32)
    };
    (
        Vec3::new(t.x as f32, t.y as f32, t.z as f32),
        [axis(nalgebra::Vector3::x()), axis(nalgebra::Vector3::y()), axis(nalgebra::Vector3::z())],
    )
}

fn draw_frame(gizmos: &mut Gizmos, pose: &Pose, length: f32) {
    let (origin, axes) = as_bevy(pose);
    let colors = [Color::srgb(1.0, 0.2, 0.2), Color::srgb(0.2, 1.0, 0.2), Color::srgb(0.3, 0.3, 1.0)];
    for (axis, color) in axes.iter().zip(colors) {
        gizmos.line(origin, origin + *axis * length, color);
    }
}

fn draw_arm(mut gizmos: Gizmos, arm: Res<Arm>) {
    let output = arm.control.output();
    let link_color = if output.moving { Color::srgb(1.0, 0.8, 0.2) } else { Color::srgb(0.9, 0.9, 0.9) };

    for pair in output.transforms.windows(2) {
        let (from, _) = as_bevy(&pair[0]);
        let (to, _) = as_bevy(&pair[1]);
        gizmos.line(from, to, link_color);
    }
    for (index, pose) in output.transforms.iter().enumerate() {
        let length = if index == output.selected { SELECTED_AXIS_LENGTH } else { AXIS_LENGTH };
        draw_frame(&mut gizmos, pose, length);
    }

    if output.gripper.len() > G_RIGHT {
        let (anchor, _) = as_bevy(&output.gripper[G_ANCHOR]);
        let finger_color = Color::srgb(0.2, 0.9, 0.9);
        for finger in [G_LEFT, G_RIGHT] {
            let (tip, axes) = as_bevy(&output.gripper[finger]);
            gizmos.line(anchor, tip, finger_color);
            // Fingers point along the manipulator x axis
            gizmos.line(tip, tip + axes[0] * 0.3, finger_color);
        }
    }

    // Ground grid around the base
    let grid_color = Color::srgb(0.3, 0.3, 0.3);
    for i in -5..=5 {
        let v = i as f32;
        gizmos.line(Vec3::new(v, -5.0, 0.0), Vec3::new(v, 5.0, 0.0), grid_color);
        gizmos.line(Vec3::new(-5.0, v, 0.0), Vec3::new(5.0, v, 0.0), grid_color);
    }
}
