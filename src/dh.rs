//! Denavit-Hartenberg parameters and the link transform they describe.
//!
//! The transform of one link relative to its parent is built as
//! `RotateX(twist) * Translate(length, 0, 0) * Translate(0, 0, offset) * RotateZ(angle)`.
//! The order is fixed; swapping any two factors changes the geometry of the whole arm.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use crate::kinematic_traits::Pose;

/// The four DH scalars of one link. Angles are in radians, lengths in model units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DhParameters {
    /// Rotation about the local x axis.
    pub twist: f64,

    /// Translation along the local x axis.
    pub length: f64,

    /// Translation along the local z axis. The live scalar of prismatic joints and fingers.
    pub offset: f64,

    /// Rotation about the local z axis. The live scalar of revolute joints.
    pub angle: f64,
}

impl DhParameters {
    pub fn new(twist: f64, length: f64, offset: f64, angle: f64) -> Self {
        DhParameters { twist, length, offset, angle }
    }

    /// Link that only translates (twist and angle zero)
    pub fn translation(length: f64, offset: f64) -> Self {
        DhParameters { length, offset, ..Default::default() }
    }

    /// Returns the parameters as `[twist, length, offset, angle]`, the order used in YAML files.
    pub fn as_array(&self) -> [f64; 4] {
        [self.twist, self.length, self.offset, self.angle]
    }

    /// Inverse of [DhParameters::as_array]
    pub fn from_array(values: [f64; 4]) -> Self {
        DhParameters::new(values[0], values[1], values[2], values[3])
    }

    /// Transform of this link relative to its parent, see [dh_transform].
    pub fn transform(&self) -> Pose {
        dh_transform(self)
    }
}

/// Converts the four DH scalars into a rigid transform. Pure; NaN or infinite
/// inputs are not sanitized and simply end up in the returned pose.
pub fn dh_transform(dh: &DhParameters) -> Pose {
    let twist = Isometry3::from_parts(
        Translation3::identity(),
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), dh.twist),
    );
    let along_x = Translation3::new(dh.length, 0.0, 0.0);
    let along_z = Translation3::new(0.0, 0.0, dh.offset);
    let angle = Isometry3::from_parts(
        Translation3::identity(),
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), dh.angle),
    );

    twist * along_x * along_z * angle
}
