//! A single controllable element of the chain.
//!
//! The DH parameters (or, for the manipulator, the gripper) are the only stored state of a joint's
//! pose. The joint position is a read view over them, so the two can never diverge.

use std::fmt;

use crate::dh::DhParameters;
use crate::engine_error::EngineError;
use crate::gripper::Gripper;
use crate::kinematic_traits::{GRIPPER_STEP, PRISMATIC_STEP, REVOLUTE_STEP_DEGREES};

/// What a joint does, and for the manipulator, the gripper it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum JointKind {
    /// Rotates about its local z axis; the live scalar is the DH angle.
    Revolute,
    /// Slides along its local z axis; the live scalar is the DH offset.
    Prismatic,
    /// Terminal joint; its position is the opening of the gripper.
    Manipulator(Gripper),
}

/// Kind of a chain element without any payload, for user interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    Base,
    Revolute,
    Prismatic,
    Manipulator,
}

impl fmt::Display for JointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JointType::Base => "base",
            JointType::Revolute => "revolute",
            JointType::Prismatic => "prismatic",
            JointType::Manipulator => "manipulator",
        };
        write!(f, "{}", name)
    }
}

/// Discrete step sizes per joint kind, in the native unit of the position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSizes {
    pub revolute: f64,
    pub prismatic: f64,
    pub gripper: f64,
}

impl Default for StepSizes {
    fn default() -> Self {
        StepSizes {
            revolute: REVOLUTE_STEP_DEGREES,
            prismatic: PRISMATIC_STEP,
            gripper: GRIPPER_STEP,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    name: String,
    kind: JointKind,
    dh: DhParameters,
    target: f64,
}

impl Joint {
    /// Creates the joint with its target set to the current position, so it starts settled.
    pub fn new(name: impl Into<String>, kind: JointKind, dh: DhParameters) -> Self {
        let mut joint = Joint {
            name: name.into(),
            kind,
            dh,
            target: 0.0,
        };
        joint.target = joint.position();
        joint
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &JointKind {
        &self.kind
    }

    pub fn joint_type(&self) -> JointType {
        match self.kind {
            JointKind::Revolute => JointType::Revolute,
            JointKind::Prismatic => JointType::Prismatic,
            JointKind::Manipulator(_) => JointType::Manipulator,
        }
    }

    pub fn dh(&self) -> &DhParameters {
        &self.dh
    }

    /// The gripper, if this is the manipulator joint.
    pub fn gripper(&self) -> Option<&Gripper> {
        match &self.kind {
            JointKind::Manipulator(gripper) => Some(gripper),
            _ => None,
        }
    }

    pub(crate) fn gripper_mut(&mut self) -> Option<&mut Gripper> {
        match &mut self.kind {
            JointKind::Manipulator(gripper) => Some(gripper),
            _ => None,
        }
    }

    /// Current position: degrees for revolute joints, the DH offset for prismatic joints
    /// and the gripper opening for the manipulator.
    pub fn position(&self) -> f64 {
        match &self.kind {
            JointKind::Revolute => self.dh.angle.to_degrees(),
            JointKind::Prismatic => self.dh.offset,
            JointKind::Manipulator(gripper) => gripper.opening(),
        }
    }

    /// Writes the position back into the DH parameters (or the gripper). No wrapping or clamping
    /// is applied. NaN is rejected and leaves the joint unchanged; infinities pass through.
    pub fn set_position(&mut self, value: f64) -> Result<(), EngineError> {
        if value.is_nan() {
            return Err(EngineError::NotANumber { what: "position" });
        }
        match &mut self.kind {
            JointKind::Revolute => self.dh.angle = value.to_radians(),
            JointKind::Prismatic => self.dh.offset = value,
            JointKind::Manipulator(gripper) => gripper.set_opening(value),
        }
        Ok(())
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Sets the position this joint should move toward. NaN is rejected.
    pub fn set_target(&mut self, target: f64) -> Result<(), EngineError> {
        if target.is_nan() {
            return Err(EngineError::NotANumber { what: "target" });
        }
        self.target = target;
        Ok(())
    }

    /// Step size for discrete moves of this joint.
    pub fn step(&self, steps: &StepSizes) -> f64 {
        match self.kind {
            JointKind::Revolute => steps.revolute,
            JointKind::Prismatic => steps.prismatic,
            JointKind::Manipulator(_) => steps.gripper,
        }
    }

    /// Moves the position a `lerp_factor` fraction of the remaining distance toward the target,
    /// unless it is already within [crate::kinematic_traits::POSITION_EPSILON].
    /// `lerp_factor >= 1` assigns the target in one call. Prismatic joints then read back the
    /// target exactly; revolute joints and the gripper go through a unit conversion and may read
    /// back one ulp off, well within the settle tolerance. Returns true if the joint moved.
    pub(crate) fn approach_target(&mut self, lerp_factor: f64, epsilon: f64) -> bool {
        let position = self.position();
        let remaining = self.target - position;
        if !(remaining.abs() > epsilon) {
            return false;
        }

        let next = if lerp_factor >= 1.0 {
            self.target
        } else {
            position + remaining * lerp_factor
        };

        // Target and position are both finite or infinite here, never NaN
        self.set_position(next).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematic_traits::POSITION_EPSILON;

    const SMALL: f64 = 1e-9;

    fn revolute() -> Joint {
        Joint::new("r", JointKind::Revolute, DhParameters::translation(1.0, 0.0))
    }

    fn prismatic() -> Joint {
        Joint::new("p", JointKind::Prismatic, DhParameters::translation(0.0, 0.5))
    }

    #[test]
    fn test_revolute_position_in_degrees() {
        let mut joint = revolute();
        joint.set_position(90.0).unwrap();
        assert!((joint.dh().angle - std::f64::consts::FRAC_PI_2).abs() < SMALL);
        assert!((joint.position() - 90.0).abs() < SMALL);
    }

    #[test]
    fn test_revolute_is_not_wrapped() {
        let mut joint = revolute();
        joint.set_position(725.0).unwrap();
        assert!((joint.position() - 725.0).abs() < SMALL);
    }

    #[test]
    fn test_prismatic_position_is_offset() {
        let mut joint = prismatic();
        assert_eq!(joint.position(), 0.5);
        joint.set_position(1.25).unwrap();
        assert_eq!(joint.dh().offset, 1.25);
    }

    #[test]
    fn test_manipulator_delegates_to_gripper() {
        let gripper = Gripper::new(0.0, 0.0, 0.1, 0.3);
        let mut joint = Joint::new("m", JointKind::Manipulator(gripper), DhParameters::default());
        assert!((joint.position() - 0.2).abs() < SMALL);
        joint.set_position(0.1).unwrap();
        assert!((joint.gripper().unwrap().opening() - 0.1).abs() < SMALL);
    }

    #[test]
    fn test_nan_rejected() {
        let mut joint = prismatic();
        let before = joint.clone();
        assert!(joint.set_position(f64::NAN).is_err());
        assert!(joint.set_target(f64::NAN).is_err());
        assert_eq!(joint, before);
    }

    #[test]
    fn test_new_joint_is_settled() {
        let mut joint = prismatic();
        assert_eq!(joint.target(), joint.position());
        assert!(!joint.approach_target(0.5, POSITION_EPSILON));
    }

    #[test]
    fn test_approach_halves_distance() {
        let mut joint = prismatic();
        joint.set_target(1.5).unwrap();
        assert!(joint.approach_target(0.5, POSITION_EPSILON));
        assert!((joint.position() - 1.0).abs() < SMALL);
    }

    #[test]
    fn test_full_lerp_lands_on_target() {
        let mut joint = prismatic();
        joint.set_target(0.3).unwrap();
        assert!(joint.approach_target(1.0, POSITION_EPSILON));
        assert_eq!(joint.position(), 0.3);
    }

    #[test]
    fn test_step_by_kind() {
        let steps = StepSizes::default();
        assert_eq!(revolute().step(&steps), 5.0);
        assert_eq!(prismatic().step(&steps), steps.prismatic);
    }
}
