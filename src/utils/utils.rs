//! Helper functions

use nalgebra::{Isometry3, UnitQuaternion};

use crate::chain::KinematicChain;
use crate::joint::JointType;

/// Single line description of the pose: translation and quaternion.
pub fn pose_to_string(isometry: &Isometry3<f64>) -> String {
    let translation = isometry.translation.vector;
    let rotation: UnitQuaternion<f64> = isometry.rotation;
    format!(
        "x: {:.5}, y: {:.5}, z: {:.5},  quat: {:.5},{:.5},{:.5},{:.5}",
        translation.x, translation.y, translation.z, rotation.i, rotation.j, rotation.k, rotation.w
    )
}

/// Print joint positions in their native units (degrees for revolute joints).
pub fn dump_positions(positions: &[f64]) {
    let row: Vec<String> = positions.iter().map(|p| format!("{:5.2}", p)).collect();
    println!("[{}]", row.join(" "));
}

/// Print every link of the chain with its type, position and pose, then the gripper.
pub fn dump_chain(chain: &KinematicChain) {
    for (index, pose) in chain.absolute_transforms().iter().enumerate() {
        let name = chain.joint(index).map(|j| j.name().to_string()).unwrap_or("base".to_string());
        let kind = chain.joint_type(index).unwrap_or(JointType::Base);
        let position = chain.joint_position(index).map(|p| format!("{:8.3}", p)).unwrap_or_default();
        println!("{:2} {:10} {:12} {:>8}  {}", index, name, kind.to_string(), position, pose_to_string(pose));
    }
    for (label, pose) in ["anchor", "left", "right"].iter().zip(chain.gripper_transforms()) {
        println!("   {:10} {:12} {:>8}  {}", label, "finger", "", pose_to_string(pose));
    }
}

/// formatting for YAML output
pub(crate) fn deg(x: &f64) -> String {
    if *x == 0.0 {
        return "0".to_string();
    }
    format!("deg({:.4})", x.to_degrees())
}
