//! Two-finger gripper attached to the last link of the chain.
//!
//! Both fingers slide along the same axis of the anchor frame. Their offsets are coupled so that
//! the midpoint between them never moves: the gripper publishes one scalar, the opening, and
//! re-derives both finger offsets from it and from the `offset` constant measured at construction.
//!
//! The gripper does not know the chain. The chain pushes the anchor pose with
//! [Gripper::update_transforms] every time its terminal transform changes.

use crate::dh::DhParameters;
use crate::kinematic_traits::Pose;

/// Index of the anchor in [Gripper::transforms]
pub const G_ANCHOR: usize = 0;
/// Index of the left finger in [Gripper::transforms]
pub const G_LEFT: usize = 1;
/// Index of the right finger in [Gripper::transforms]
pub const G_RIGHT: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Gripper {
    left: DhParameters,
    right: DhParameters,

    /// Sum of both finger offsets, fixed at construction.
    offset: f64,

    /// Anchor, left finger, right finger. Fingers attach to the anchor directly, not to each other.
    transforms: [Pose; 3],
}

impl Gripper {
    /// Creates the gripper from the finger geometry. `twist` and `length` are shared by both
    /// fingers, `left_offset` and `right_offset` are the bind-pose finger positions along the
    /// sliding axis. The opening right after construction is `right_offset - left_offset`.
    pub fn new(twist: f64, length: f64, left_offset: f64, right_offset: f64) -> Self {
        let left = DhParameters::new(twist, length, left_offset, 0.0);
        let right = DhParameters::new(twist, length, right_offset, 0.0);
        let mut gripper = Gripper {
            left,
            right,
            offset: left_offset + right_offset,
            transforms: [Pose::identity(); 3],
        };
        gripper.update_transforms(&Pose::identity());
        gripper
    }

    /// Distance between the fingers along the sliding axis.
    pub fn opening(&self) -> f64 {
        self.right.offset - self.left.offset
    }

    /// Moves both fingers symmetrically so that [Gripper::opening] returns `opening`.
    /// Values beyond `±offset` push one finger through the anchor; this is not prevented here.
    /// Call [Gripper::update_transforms] afterwards before reading finger poses.
    pub fn set_opening(&mut self, opening: f64) {
        self.left.offset = (self.offset - opening) / 2.0;
        self.right.offset = (self.offset + opening) / 2.0;
    }

    /// The fixed sum of finger offsets. Openings in `[-offset, offset]` keep both fingers on
    /// their own side of the anchor.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn left(&self) -> &DhParameters {
        &self.left
    }

    pub fn right(&self) -> &DhParameters {
        &self.right
    }

    /// Recomputes finger poses from the given anchor pose.
    pub fn update_transforms(&mut self, origin: &Pose) {
        self.transforms[G_ANCHOR] = *origin;
        self.transforms[G_LEFT] = origin * self.left.transform();
        self.transforms[G_RIGHT] = origin * self.right.transform();
    }

    /// Anchor, left and right finger poses, as of the last [Gripper::update_transforms].
    pub fn transforms(&self) -> &[Pose] {
        &self.transforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Translation3, UnitQuaternion, Vector3};
    use std::f64::consts::FRAC_PI_2;

    const SMALL: f64 = 1e-12;

    #[test]
    fn test_opening_after_construction() {
        let gripper = Gripper::new(-FRAC_PI_2, 0.1, 0.1, 0.3);
        assert!((gripper.opening() - 0.2).abs() < SMALL);
        assert!((gripper.offset() - 0.4).abs() < SMALL);
    }

    #[test]
    fn test_set_opening_round_trip() {
        let mut gripper = Gripper::new(-FRAC_PI_2, 0.1, 0.1, 0.3);
        for opening in [0.0, 0.05, 0.2, 0.3999, -0.1] {
            gripper.set_opening(opening);
            assert!(
                (gripper.opening() - opening).abs() < SMALL,
                "Opening {} came back as {}", opening, gripper.opening()
            );
        }
    }

    #[test]
    fn test_midpoint_stays_fixed() {
        let mut gripper = Gripper::new(-FRAC_PI_2, 0.0, 0.1, 0.3);
        let midpoint = |g: &Gripper| (g.left().offset + g.right().offset) / 2.0;
        let before = midpoint(&gripper);
        gripper.set_opening(0.05);
        assert!((midpoint(&gripper) - before).abs() < SMALL);
    }

    #[test]
    fn test_fingers_attach_to_anchor() {
        let mut gripper = Gripper::new(-FRAC_PI_2, 0.1, 0.1, 0.3);
        let anchor = Pose::from_parts(
            Translation3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.3),
        );
        gripper.update_transforms(&anchor);

        let t = gripper.transforms();
        assert_eq!(t[G_ANCHOR], anchor);
        assert_eq!(t[G_LEFT], anchor * gripper.left().transform());
        assert_eq!(t[G_RIGHT], anchor * gripper.right().transform());
    }

    #[test]
    fn test_fingers_slide_along_anchor_y() {
        // Twist of -90 degrees turns the finger z axis into the anchor +y axis
        let mut gripper = Gripper::new(-FRAC_PI_2, 0.0, 0.1, 0.3);
        gripper.update_transforms(&Pose::identity());
        let left = gripper.transforms()[G_LEFT] * Point3::origin();
        let right = gripper.transforms()[G_RIGHT] * Point3::origin();
        assert!((left.y - 0.1).abs() < SMALL);
        assert!((right.y - 0.3).abs() < SMALL);
        assert!(left.z.abs() < SMALL && right.z.abs() < SMALL);
    }
}
