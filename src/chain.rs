//! Serial kinematic chain: the base, the controllable joints and the gripper on the last one.
//!
//! Indices follow the chain order of the skeleton. Index 0 is the immobile base and is never
//! selectable; indices `1..=N-1` are the controllable joints, the last one being the manipulator.
//! The chain owns one absolute transform per index with
//!
//! ```text
//! absolute[0] = base world transform
//! absolute[i] = absolute[i-1] * dh_transform(joints[i].dh)
//! ```
//!
//! Transforms are not recomputed lazily. Whoever mutates DH parameters calls
//! [KinematicChain::recompute_transforms] before transforms are read; the cost is O(N) per call.

use nalgebra::{Translation3, UnitQuaternion};
use tracing::{debug, info};

use crate::dh::dh_transform;
use crate::engine_error::EngineError;
use crate::joint::{Joint, JointKind, JointType, StepSizes};
use crate::kinematic_traits::{Pose, Positions, J_BASE, J_FIRST_CONTROLLABLE, POSITION_EPSILON};
use crate::parameter_error::ParameterError;
use crate::skeleton::{BoneKind, Skeleton};

/// Direction of a discrete joint step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Decrease,
    Increase,
}

impl Direction {
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Decrease => -1.0,
            Direction::Increase => 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KinematicChain {
    /// World transform of the base
    base: Pose,

    /// Controllable joints; `joints[k]` is chain index `k + 1`.
    joints: Vec<Joint>,

    /// One entry per chain index including the base.
    absolute: Vec<Pose>,

    /// Currently selected joint, always a controllable index.
    selected: usize,
}

impl KinematicChain {
    /// Builds the chain from a skeleton. The bind pose is read only here.
    pub fn from_skeleton(skeleton: &Skeleton) -> Result<Self, ParameterError> {
        skeleton.validate()?;

        let base = Pose::from_parts(
            Translation3::from(skeleton.bones[J_BASE].translation),
            UnitQuaternion::identity(),
        );

        let mut joints = Vec::with_capacity(skeleton.bone_count() - 1);
        for index in J_FIRST_CONTROLLABLE..skeleton.bone_count() {
            let bone = &skeleton.bones[index];
            let dh = skeleton.link_dh(index);
            let kind = match bone.kind {
                BoneKind::Revolute => JointKind::Revolute,
                BoneKind::Prismatic => JointKind::Prismatic,
                BoneKind::Manipulator => {
                    // validate() has checked that the gripper is present
                    let fingers = skeleton.gripper.as_ref().ok_or_else(|| {
                        ParameterError::MissingField("gripper".to_string())
                    })?;
                    JointKind::Manipulator(fingers.to_gripper())
                }
                BoneKind::Base => {
                    return Err(ParameterError::KinematicsConfigurationError(format!(
                        "bone {} ('{}') is a second base", index, bone.name
                    )));
                }
            };
            joints.push(Joint::new(bone.name.clone(), kind, dh));
        }

        let mut chain = KinematicChain {
            base,
            absolute: vec![base; joints.len() + 1],
            joints,
            selected: J_FIRST_CONTROLLABLE,
        };
        chain.recompute_transforms();

        info!(
            "Built kinematic chain of {} bones: {}",
            chain.bone_count(),
            chain.joints.iter().map(|j| format!("{} ({})", j.name(), j.joint_type()))
                .collect::<Vec<_>>().join(", ")
        );
        Ok(chain)
    }

    /// Number of chain elements including the base.
    pub fn bone_count(&self) -> usize {
        self.joints.len() + 1
    }

    /// Number of joints the operator can move (all but the base).
    pub fn controllable_count(&self) -> usize {
        self.joints.len()
    }

    /// Highest controllable index, the manipulator.
    pub fn last_index(&self) -> usize {
        self.joints.len()
    }

    fn check_index(&self, index: usize) -> Result<usize, EngineError> {
        if index < J_FIRST_CONTROLLABLE || index > self.last_index() {
            return Err(EngineError::JointIndexOutOfRange { index, last: self.last_index() });
        }
        Ok(index - J_FIRST_CONTROLLABLE)
    }

    /// Joint at a controllable index.
    pub fn joint(&self, index: usize) -> Result<&Joint, EngineError> {
        let k = self.check_index(index)?;
        Ok(&self.joints[k])
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint_position(&self, index: usize) -> Result<f64, EngineError> {
        Ok(self.joint(index)?.position())
    }

    pub fn target_position(&self, index: usize) -> Result<f64, EngineError> {
        Ok(self.joint(index)?.target())
    }

    /// Type of any chain element, the base included.
    pub fn joint_type(&self, index: usize) -> Result<JointType, EngineError> {
        if index == J_BASE {
            return Ok(JointType::Base);
        }
        Ok(self.joint(index)?.joint_type())
    }

    /// Current positions of joints `1..=N-1`, in chain order.
    pub fn positions(&self) -> Positions {
        self.joints.iter().map(|j| j.position()).collect()
    }

    /// Current targets of joints `1..=N-1`, in chain order.
    pub fn targets(&self) -> Positions {
        self.joints.iter().map(|j| j.target()).collect()
    }

    /// Replaces all targets at once. The slice must hold one value per controllable joint and no
    /// NaN; otherwise nothing changes.
    pub fn set_targets(&mut self, targets: &[f64]) -> Result<(), EngineError> {
        if targets.len() != self.joints.len() {
            return Err(EngineError::SnapshotLengthMismatch {
                expected: self.joints.len(),
                found: targets.len(),
            });
        }
        if targets.iter().any(|t| t.is_nan()) {
            return Err(EngineError::NotANumber { what: "target" });
        }
        for (joint, target) in self.joints.iter_mut().zip(targets) {
            joint.set_target(*target)?;
        }
        Ok(())
    }

    /// Sets the target of one joint directly, as a slider would.
    pub fn update_target_position(&mut self, index: usize, value: f64) -> Result<(), EngineError> {
        let k = self.check_index(index)?;
        self.joints[k].set_target(value)
    }

    /// Sets the live position of one joint immediately, bypassing smoothing. The target is left
    /// alone. Transforms must be recomputed before they are read.
    pub fn set_joint_position(&mut self, index: usize, value: f64) -> Result<(), EngineError> {
        let k = self.check_index(index)?;
        self.joints[k].set_position(value)
    }

    /// Moves the target of a joint by one kind-dependent step. Visible motion follows through
    /// [KinematicChain::advance_toward_targets].
    pub fn move_joint_discrete(
        &mut self,
        index: usize,
        direction: Direction,
        steps: &StepSizes,
    ) -> Result<(), EngineError> {
        let k = self.check_index(index)?;
        let joint = &mut self.joints[k];
        let target = joint.target() + joint.step(steps) * direction.sign();
        joint.set_target(target)
    }

    /// Moves every controllable joint a `lerp_factor` fraction of its remaining distance toward
    /// its target and recomputes transforms if anything moved. Joints within
    /// [POSITION_EPSILON] of their target stay put. Returns true while any joint is still moving.
    pub fn advance_toward_targets(&mut self, lerp_factor: f64) -> bool {
        let mut moving = false;
        for joint in self.joints.iter_mut() {
            // Positions are read from each joint's own DH parameters, so the order does not matter
            moving |= joint.approach_target(lerp_factor, POSITION_EPSILON);
        }
        if moving {
            self.recompute_transforms();
        }
        moving
    }

    /// True if every joint is within [POSITION_EPSILON] of its target.
    pub fn is_settled(&self) -> bool {
        self.joints.iter().all(|j| !((j.target() - j.position()).abs() > POSITION_EPSILON))
    }

    /// Recomputes all absolute transforms root to tip and pushes the terminal transform into
    /// the gripper.
    pub fn recompute_transforms(&mut self) {
        self.absolute[J_BASE] = self.base;
        for (k, joint) in self.joints.iter().enumerate() {
            let index = k + J_FIRST_CONTROLLABLE;
            self.absolute[index] = self.absolute[index - 1] * dh_transform(joint.dh());
        }

        let tcp = self.absolute[self.last_index()];
        if let Some(gripper) = self.joints.last_mut().and_then(|j| j.gripper_mut()) {
            gripper.update_transforms(&tcp);
        }
    }

    /// Absolute transforms of every chain element, base included, as of the last recompute.
    pub fn absolute_transforms(&self) -> &[Pose] {
        &self.absolute
    }

    /// Anchor, left and right finger transforms of the gripper.
    pub fn gripper_transforms(&self) -> &[Pose] {
        match self.joints.last().and_then(|j| j.gripper()) {
            Some(gripper) => gripper.transforms(),
            None => &[],
        }
    }

    /// Transform of the manipulator, where the gripper is mounted.
    pub fn tcp(&self) -> Pose {
        self.absolute[self.last_index()]
    }

    pub fn base(&self) -> &Pose {
        &self.base
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Selects a controllable joint; out of range indices are rejected.
    pub fn select(&mut self, index: usize) -> Result<(), EngineError> {
        self.check_index(index)?;
        self.selected = index;
        Ok(())
    }

    /// Selects the next joint, wrapping from the manipulator back to the first controllable joint.
    pub fn select_next(&mut self) -> usize {
        self.selected = if self.selected >= self.last_index() {
            J_FIRST_CONTROLLABLE
        } else {
            self.selected + 1
        };
        debug!("Selected joint {}", self.selected);
        self.selected
    }

    /// Selects the previous joint, wrapping from the first controllable joint to the manipulator.
    pub fn select_previous(&mut self) -> usize {
        self.selected = if self.selected <= J_FIRST_CONTROLLABLE {
            self.last_index()
        } else {
            self.selected - 1
        };
        debug!("Selected joint {}", self.selected);
        self.selected
    }
}
