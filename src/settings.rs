//! Tunables of the control loop

use crate::joint::StepSizes;
use crate::kinematic_traits::{DWELL_FRAMES, LERP_FACTOR};
use crate::parameter_error::ParameterError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSettings {
    /// Fraction of the remaining distance to the target covered each frame, in (0, 1].
    pub lerp_factor: f64,

    /// Frames a recorded snapshot stays the active target during playback, at least 1.
    pub dwell_frames: u32,

    /// Discrete step sizes per joint kind.
    pub steps: StepSizes,
}

impl Default for ControlSettings {
    fn default() -> Self {
        ControlSettings {
            lerp_factor: LERP_FACTOR,
            dwell_frames: DWELL_FRAMES,
            steps: StepSizes::default(),
        }
    }
}

impl ControlSettings {
    /// Checks the ranges, returns the settings unchanged if they are usable.
    pub fn validated(self) -> Result<Self, ParameterError> {
        if !(self.lerp_factor > 0.0 && self.lerp_factor <= 1.0) {
            return Err(ParameterError::KinematicsConfigurationError(format!(
                "lerp_factor must be in (0, 1], got {}", self.lerp_factor
            )));
        }
        if self.dwell_frames == 0 {
            return Err(ParameterError::KinematicsConfigurationError(
                "dwell_frames must be at least 1".to_string()
            ));
        }
        for (name, step) in [
            ("revolute", self.steps.revolute),
            ("prismatic", self.steps.prismatic),
            ("gripper", self.steps.gripper),
        ] {
            if !step.is_finite() {
                return Err(ParameterError::KinematicsConfigurationError(format!(
                    "{} step must be finite (got {})", name, step
                )));
            }
        }
        Ok(self)
    }
}
