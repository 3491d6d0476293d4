//! Skeleton description that a kinematic chain is built from.
//!
//! A skeleton lists the bones of the arm in chain order with their bind-pose origins. It is read
//! once, when the chain is constructed, and never consulted afterwards. Bind-pose frames are
//! assumed to be axis aligned (all joint values zero) in a z-up model space, so the fixed DH
//! constants of a bone can be derived from the translation between consecutive bone origins:
//!
//! ```text
//! delta  = translation[i] - translation[i-1]
//! twist  = 0
//! length = delta.x
//! offset = delta.z
//! angle  = 0
//! ```
//!
//! A lateral `delta.y` cannot be expressed without a twist and is dropped with a warning. Bones
//! that need a twist (or any other non-derivable geometry) carry explicit DH parameters instead.

use std::f64::consts::FRAC_PI_2;

use nalgebra::Vector3;
use tracing::warn;

use crate::dh::DhParameters;
use crate::gripper::Gripper;
use crate::parameter_error::ParameterError;
use crate::settings::ControlSettings;

/// Role of a bone in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoneKind {
    Base,
    Revolute,
    Prismatic,
    Manipulator,
}

impl BoneKind {
    /// Parses the names used in YAML files (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "base" => Some(BoneKind::Base),
            "revolute" => Some(BoneKind::Revolute),
            "prismatic" => Some(BoneKind::Prismatic),
            "manipulator" | "gripper" => Some(BoneKind::Manipulator),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoneKind::Base => "base",
            BoneKind::Revolute => "revolute",
            BoneKind::Prismatic => "prismatic",
            BoneKind::Manipulator => "manipulator",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub kind: BoneKind,

    /// Bind-pose origin in model space. For the base this is also its world position.
    pub translation: Vector3<f64>,

    /// Explicit DH parameters. When present, `translation` is not used to derive geometry.
    pub dh: Option<DhParameters>,
}

impl Bone {
    pub fn new(name: &str, kind: BoneKind, translation: Vector3<f64>) -> Self {
        Bone { name: name.to_string(), kind, translation, dh: None }
    }

    pub fn with_dh(name: &str, kind: BoneKind, translation: Vector3<f64>, dh: DhParameters) -> Self {
        Bone { name: name.to_string(), kind, translation, dh: Some(dh) }
    }
}

/// Finger origins, relative to the manipulator frame.
///
/// Both fingers slide along the manipulator +y axis (finger twist of -90 degrees). The `x`
/// coordinate becomes the finger DH length, `y` the live finger offset; `z` is not representable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerPair {
    pub left: Vector3<f64>,
    pub right: Vector3<f64>,
}

impl FingerPair {
    pub fn new(left: Vector3<f64>, right: Vector3<f64>) -> Self {
        FingerPair { left, right }
    }

    /// Builds the gripper, measuring its fixed offset constant from the finger positions.
    pub fn to_gripper(&self) -> Gripper {
        if self.left.x != self.right.x {
            warn!(
                "Fingers have different lengths ({} and {}), using the left one",
                self.left.x, self.right.x
            );
        }
        if self.left.z != 0.0 || self.right.z != 0.0 {
            warn!(
                "Finger z offsets ({} and {}) cannot be expressed and are ignored",
                self.left.z, self.right.z
            );
        }
        Gripper::new(-FRAC_PI_2, self.left.x, self.left.y, self.right.y)
    }
}

/// Description of the arm as delivered by the asset loading layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    /// Bones in chain order: the base first, the manipulator last.
    pub bones: Vec<Bone>,

    /// Gripper mounted on the manipulator bone.
    pub gripper: Option<FingerPair>,

    /// Control loop tunables that travel with the robot description.
    pub settings: ControlSettings,
}

impl Skeleton {
    pub fn new(bones: Vec<Bone>, gripper: FingerPair) -> Self {
        Skeleton {
            bones,
            gripper: Some(gripper),
            settings: ControlSettings::default(),
        }
    }

    /// Number of bones including the base.
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Checks the structure: the base first and only there, the manipulator last and only there,
    /// at least these two bones, a gripper, and usable settings.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let config_error = |msg: String| Err(ParameterError::KinematicsConfigurationError(msg));

        if self.bones.len() < 2 {
            return config_error(format!(
                "a skeleton needs at least a base and a manipulator, got {} bone(s)",
                self.bones.len()
            ));
        }
        let last = self.bones.len() - 1;
        for (i, bone) in self.bones.iter().enumerate() {
            match bone.kind {
                BoneKind::Base if i != 0 => {
                    return config_error(format!("bone {} ('{}') is a base but is not first", i, bone.name));
                }
                BoneKind::Manipulator if i != last => {
                    return config_error(format!("bone {} ('{}') is a manipulator but is not last", i, bone.name));
                }
                _ => {}
            }
        }
        if self.bones[0].kind != BoneKind::Base {
            return config_error(format!("first bone '{}' must be the base", self.bones[0].name));
        }
        if self.bones[last].kind != BoneKind::Manipulator {
            return config_error(format!("last bone '{}' must be the manipulator", self.bones[last].name));
        }
        if self.gripper.is_none() {
            return Err(ParameterError::MissingField("gripper".to_string()));
        }
        self.settings.validated().map(|_| ())
    }

    /// Fixed DH constants of bone `index` (1 and up), explicit or derived from the bind pose.
    ///
    /// Panics if `index` is 0 or out of range; callers validate the skeleton first.
    pub(crate) fn link_dh(&self, index: usize) -> DhParameters {
        assert!(index >= 1 && index < self.bones.len(), "bone {} has no parent", index);
        let bone = &self.bones[index];
        if let Some(dh) = bone.dh {
            return dh;
        }

        let delta = bone.translation - self.bones[index - 1].translation;
        if delta.y != 0.0 {
            warn!(
                "Bone '{}' is displaced by {} along y, which DH geometry without twist cannot express",
                bone.name, delta.y
            );
        }
        DhParameters::translation(delta.x, delta.z)
    }

    /// Convert to string yaml representation (quick viewing, export).
    pub fn to_yaml(&self) -> String {
        fn xyz(v: &Vector3<f64>) -> String {
            format!("[{}, {}, {}]", v.x, v.y, v.z)
        }

        let mut yaml = String::from("links:\n");
        for bone in &self.bones {
            yaml.push_str(&format!(
                "  - name: {}\n    kind: {}\n    translation: {}\n",
                bone.name, bone.kind.name(), xyz(&bone.translation)
            ));
            if let Some(dh) = bone.dh {
                yaml.push_str(&format!(
                    "    dh: [{}, {}, {}, {}]\n",
                    crate::utils::deg(&dh.twist), dh.length, dh.offset, crate::utils::deg(&dh.angle)
                ));
            }
        }
        if let Some(fingers) = &self.gripper {
            yaml.push_str(&format!(
                "gripper:\n  left: {}\n  right: {}\n",
                xyz(&fingers.left), xyz(&fingers.right)
            ));
        }
        let s = &self.settings;
        yaml.push_str(&format!(
            "settings:\n  \
              lerp_factor: {}\n  \
              dwell_frames: {}\n  \
              revolute_step: {}\n  \
              prismatic_step: {}\n  \
              gripper_step: {}\n",
            s.lerp_factor, s.dwell_frames, s.steps.revolute, s.steps.prismatic, s.steps.gripper
        ));
        yaml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingers() -> FingerPair {
        FingerPair::new(Vector3::new(0.1, 0.1, 0.0), Vector3::new(0.1, 0.3, 0.0))
    }

    fn stacked() -> Skeleton {
        Skeleton::new(
            vec![
                Bone::new("platform", BoneKind::Base, Vector3::new(0.0, 0.0, 0.0)),
                Bone::new("segment", BoneKind::Revolute, Vector3::new(0.0, 0.0, 1.0)),
                Bone::new("lift", BoneKind::Prismatic, Vector3::new(0.5, 0.0, 3.0)),
                Bone::new("hand", BoneKind::Manipulator, Vector3::new(0.5, 0.0, 5.0)),
            ],
            fingers(),
        )
    }

    #[test]
    fn test_derived_dh_from_bind_pose() {
        let skeleton = stacked();
        assert_eq!(skeleton.link_dh(1), DhParameters::translation(0.0, 1.0));
        assert_eq!(skeleton.link_dh(2), DhParameters::translation(0.5, 2.0));
        assert_eq!(skeleton.link_dh(3), DhParameters::translation(0.0, 2.0));
    }

    #[test]
    fn test_explicit_dh_wins() {
        let mut skeleton = stacked();
        let dh = DhParameters::new(FRAC_PI_2, 0.0, 0.0, 0.0);
        skeleton.bones[1].dh = Some(dh);
        assert_eq!(skeleton.link_dh(1), dh);
    }

    #[test]
    fn test_valid_skeleton() {
        assert!(stacked().validate().is_ok());
    }

    #[test]
    fn test_base_must_be_first() {
        let mut skeleton = stacked();
        skeleton.bones.swap(0, 1);
        assert!(skeleton.validate().is_err());
    }

    #[test]
    fn test_manipulator_must_be_last() {
        let mut skeleton = stacked();
        skeleton.bones[2].kind = BoneKind::Manipulator;
        assert!(skeleton.validate().is_err());
        skeleton.bones[2].kind = BoneKind::Prismatic;
        skeleton.bones[3].kind = BoneKind::Revolute;
        assert!(skeleton.validate().is_err());
    }

    #[test]
    fn test_too_short() {
        let skeleton = Skeleton::new(vec![Bone::new("b", BoneKind::Base, Vector3::zeros())], fingers());
        assert!(skeleton.validate().is_err());
    }

    #[test]
    fn test_gripper_required() {
        let mut skeleton = stacked();
        skeleton.gripper = None;
        assert!(matches!(skeleton.validate(), Err(ParameterError::MissingField(_))));
    }

    #[test]
    fn test_finger_pair_to_gripper() {
        let gripper = fingers().to_gripper();
        assert!((gripper.opening() - 0.2).abs() < 1e-12);
        assert!((gripper.offset() - 0.4).abs() < 1e-12);
        assert_eq!(gripper.left().length, 0.1);
    }

    #[test]
    fn test_kind_names() {
        for kind in [BoneKind::Base, BoneKind::Revolute, BoneKind::Prismatic, BoneKind::Manipulator] {
            assert_eq!(BoneKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(BoneKind::from_name("Revolute"), Some(BoneKind::Revolute));
        assert_eq!(BoneKind::from_name("wheel"), None);
    }
}
