//! Shared type aliases and engine constants.

extern crate nalgebra as na;

use na::Isometry3;

/// Pose is used for every link frame of the arm. It contains both Cartesian position and rotation quaternion.
/// Renderers that need a 4x4 matrix can call `to_homogeneous()` on it.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.5);
/// let transform = Pose::from_parts(translation, rotation);
/// let matrix = transform.to_homogeneous(); // 4x4
/// assert_eq!(matrix[(0, 3)], 1.0);
/// ```
pub type Pose = Isometry3<f64>;

/// Positions of the controllable joints (1..N-1), in their native units: degrees for revolute
/// joints, model length units for prismatic joints and the gripper opening.
pub type Positions = Vec<f64>;

/// Index of the immobile base in the chain. Never selectable.
pub const J_BASE: usize = 0;

/// First joint that the operator can select and move.
pub const J_FIRST_CONTROLLABLE: usize = 1;

/// Distance (in the native unit of the joint) below which a joint counts as settled on its target.
pub const POSITION_EPSILON: f64 = 0.001;

/// Frames each recorded snapshot stays the active target during playback (1 second at 60 Hz).
pub const DWELL_FRAMES: u32 = 60;

/// Default discrete step of a revolute joint, degrees.
pub const REVOLUTE_STEP_DEGREES: f64 = 5.0;

/// Default discrete step of a prismatic joint, model length units.
pub const PRISMATIC_STEP: f64 = 0.1;

/// Default discrete step of the gripper opening, model length units.
pub const GRIPPER_STEP: f64 = 0.02;

/// Default fraction of the remaining distance covered per frame.
pub const LERP_FACTOR: f64 = 0.1;
