//! Hardcoded skeletons for the built-in robot types

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;

use crate::dh::DhParameters;
use crate::parameter_error::ParameterError;
use crate::skeleton::{Bone, BoneKind, FingerPair, Skeleton};

/// Height of the platform the first joint sits on.
const PLATFORM_HEIGHT: f64 = 1.0;

/// Length of every arm segment.
const SEGMENT_LENGTH: f64 = 2.0;

/// Built-in robot types, as offered in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RobotPreset {
    #[default]
    Two,
    Three,
}

impl RobotPreset {
    pub const ALL: [RobotPreset; 2] = [RobotPreset::Two, RobotPreset::Three];

    /// Case-insensitive lookup by name ("two", "three").
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "two" | "2" => Some(RobotPreset::Two),
            "three" | "3" => Some(RobotPreset::Three),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RobotPreset::Two => "TWO",
            RobotPreset::Three => "THREE",
        }
    }

    pub fn skeleton(&self) -> Skeleton {
        match self {
            RobotPreset::Two => Skeleton::two_segment(),
            RobotPreset::Three => Skeleton::three_segment(),
        }
    }
}

impl fmt::Display for RobotPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RobotPreset {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RobotPreset::from_name(s).ok_or_else(|| {
            ParameterError::ParseError(format!("unknown robot type '{}' (expected two or three)", s))
        })
    }
}

impl Skeleton {
    /// Fingers shared by both presets: opening 0.2, offset constant 0.4.
    fn preset_fingers() -> FingerPair {
        FingerPair::new(Vector3::new(0.1, 0.1, 0.0), Vector3::new(0.1, 0.3, 0.0))
    }

    /// Yawing base with a shoulder, an elbow and the gripper: two segments.
    /// The arm lies horizontally along +x at the bind pose.
    pub fn two_segment() -> Self {
        let h = PLATFORM_HEIGHT;
        let l = SEGMENT_LENGTH;
        Skeleton::new(
            vec![
                Bone::new("platform", BoneKind::Base, Vector3::zeros()),
                Bone::with_dh("yaw", BoneKind::Revolute, Vector3::new(0.0, 0.0, h),
                              DhParameters::translation(0.0, h)),
                Bone::with_dh("shoulder", BoneKind::Revolute, Vector3::new(0.0, 0.0, h),
                              DhParameters::new(FRAC_PI_2, 0.0, 0.0, 0.0)),
                Bone::with_dh("elbow", BoneKind::Revolute, Vector3::new(l, 0.0, h),
                              DhParameters::translation(l, 0.0)),
                Bone::with_dh("hand", BoneKind::Manipulator, Vector3::new(2.0 * l, 0.0, h),
                              DhParameters::translation(l, 0.0)),
            ],
            Skeleton::preset_fingers(),
        )
    }

    /// As [Skeleton::two_segment], on a prismatic lift and with a third segment.
    pub fn three_segment() -> Self {
        let h = PLATFORM_HEIGHT;
        let l = SEGMENT_LENGTH;
        Skeleton::new(
            vec![
                Bone::new("platform", BoneKind::Base, Vector3::zeros()),
                Bone::with_dh("lift", BoneKind::Prismatic, Vector3::new(0.0, 0.0, h),
                              DhParameters::translation(0.0, h)),
                Bone::with_dh("yaw", BoneKind::Revolute, Vector3::new(0.0, 0.0, h),
                              DhParameters::default()),
                Bone::with_dh("shoulder", BoneKind::Revolute, Vector3::new(0.0, 0.0, h),
                              DhParameters::new(FRAC_PI_2, 0.0, 0.0, 0.0)),
                Bone::with_dh("elbow", BoneKind::Revolute, Vector3::new(l, 0.0, h),
                              DhParameters::translation(l, 0.0)),
                Bone::with_dh("wrist", BoneKind::Revolute, Vector3::new(2.0 * l, 0.0, h),
                              DhParameters::translation(l, 0.0)),
                Bone::with_dh("hand", BoneKind::Manipulator, Vector3::new(3.0 * l, 0.0, h),
                              DhParameters::translation(l, 0.0)),
            ],
            Skeleton::preset_fingers(),
        )
    }
}
