//! Rust implementation of a Denavit-Hartenberg kinematic chain engine for interactively controlled
//! articulated robot arms.
//!
//! The arm is a serial chain: an immobile base, revolute and prismatic joints, and a manipulator
//! carrying a two-finger gripper. Every joint is described by the four classic DH parameters
//! (twist, length, offset, angle). Each joint exposes one scalar "position" that is mapped onto
//! the DH parameter it actuates: the angle (in degrees) for revolute joints, the offset for
//! prismatic joints and the finger opening for the manipulator.
//!
//! # Features
//!
//! - Forward kinematics by DH composition, producing the world pose of every link and finger.
//! - Discrete operator commands (select a joint, step it up or down, set a target directly).
//! - Smooth, frame-rate driven interpolation of joints toward their targets.
//! - Teach mode to record whole-arm snapshots, work mode to replay them cyclically.
//! - A fixed-order per-frame control loop, scriptable from text.
//! - Built-in TWO and THREE segment robots, and skeletons read from YAML files with the `deg(angle)`
//!   extension.
//! - Optional bevy viewer with an egui control panel.
//!
//! # Conventions
//!
//! ```text
//! T_i = rot_x(twist) * trans_x(length) * trans_z(offset) * rot_z(angle)
//! absolute[0] = base
//! absolute[i] = absolute[i-1] * T_i
//! ```
//!
//! Indices follow the chain order: 0 is the base, `1..N-1` are the controllable joints with the
//! manipulator last. Poses are `nalgebra::Isometry3<f64>`.
//!
//! ## Example
//!
//! ```
//! use rs_dh_arm::control_loop::{ControlLoop, Intent};
//! use rs_dh_arm::chain::Direction;
//! use rs_dh_arm::skeleton::Skeleton;
//!
//! let mut control = ControlLoop::from_skeleton(&Skeleton::two_segment()).unwrap();
//! let frame = control.tick(&[Intent::Step(Direction::Increase)]);
//! assert!(frame.moving);
//! ```

pub mod kinematic_traits;
pub mod dh;
pub mod gripper;
pub mod joint;
pub mod chain;
pub mod teach;
pub mod control_loop;
pub mod settings;

pub mod skeleton;
pub mod skeleton_presets;

#[cfg(feature = "allow_filesystem")]
pub mod skeleton_from_file;

pub mod engine_error;
pub mod parameter_error;

#[path = "utils/utils.rs"]
pub mod utils;

#[path = "visualize/visualization.rs"]
#[cfg(feature = "visualization")]
pub mod visualization;

#[path = "visualize/camera_controller.rs"]
#[cfg(feature = "visualization")]
mod camera_controller;

#[cfg(test)]
mod tests;
