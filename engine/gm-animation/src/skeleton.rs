//! Rest pose, bind pose and joint names for one rig

use glam::Mat4;

use crate::error::{AnimationError, Result};
use crate::pose::Pose;

/// Static description of a rig
///
/// The inverse bind matrices are derived from the bind pose whenever the
/// properties are set and never change during playback.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skeleton {
    rest_pose: Pose,
    bind_pose: Pose,
    inv_bind_pose: Vec<Mat4>,
    joint_names: Vec<String>,
}

impl Skeleton {
    /// Build a skeleton and derive its inverse bind matrices
    pub fn new(rest: Pose, bind: Pose, names: Vec<String>) -> Result<Self> {
        let mut skeleton = Self::default();
        skeleton.set_properties(rest, bind, names)?;
        Ok(skeleton)
    }

    /// Replace all poses and names
    ///
    /// The rest pose, bind pose and name list must all describe the same
    /// joints.
    pub fn set_properties(&mut self, rest: Pose, bind: Pose, names: Vec<String>) -> Result<()> {
        if rest.len() != bind.len() || rest.len() != names.len() {
            return Err(AnimationError::ValidationError(format!(
                "skeleton has {} rest joints, {} bind joints and {} names",
                rest.len(),
                bind.len(),
                names.len()
            )));
        }

        self.rest_pose = rest;
        self.bind_pose = bind;
        self.joint_names = names;
        self.update_inverse_bind_pose();
        Ok(())
    }

    fn update_inverse_bind_pose(&mut self) {
        self.inv_bind_pose.clear();
        self.inv_bind_pose.extend(
            (0..self.bind_pose.len())
                .map(|i| self.bind_pose.global_transform(i).to_mat4().inverse()),
        );
    }

    pub fn rest_pose(&self) -> &Pose {
        &self.rest_pose
    }

    pub fn bind_pose(&self) -> &Pose {
        &self.bind_pose
    }

    pub fn inv_bind_pose(&self) -> &[Mat4] {
        &self.inv_bind_pose
    }

    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    pub fn joint_name(&self, index: usize) -> Option<&str> {
        self.joint_names.get(index).map(String::as_str)
    }

    /// Index of the first joint called `name`
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joint_names.iter().position(|joint| joint == name)
    }

    pub fn joint_count(&self) -> usize {
        self.rest_pose.len()
    }

    /// Fill `out` with `global(pose)[i] * inv_bind[i]` for every joint
    ///
    /// This is the matrix a skinned vertex is multiplied by.
    pub fn skin_matrices(&self, pose: &Pose, out: &mut Vec<Mat4>) {
        pose.matrix_palette(out);
        for (matrix, inv_bind) in out.iter_mut().zip(&self.inv_bind_pose) {
            *matrix *= *inv_bind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;
    use glam::{Quat, Vec3};

    fn two_bone() -> Skeleton {
        let joints = vec![
            Transform::new(Vec3::new(0.0, 1.0, 0.0), Quat::from_rotation_y(0.4), Vec3::ONE),
            Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
        ];
        let rest = Pose::from_parts(joints, vec![-1, 0]).unwrap();
        let bind = rest.clone();
        Skeleton::new(rest, bind, vec!["hip".into(), "knee".into()]).unwrap()
    }

    #[test]
    fn test_inverse_bind_is_inverse_of_global_bind() {
        let skeleton = two_bone();
        for i in 0..skeleton.joint_count() {
            let global = skeleton.bind_pose().global_transform(i).to_mat4();
            let product = global * skeleton.inv_bind_pose()[i];
            assert!(product.abs_diff_eq(Mat4::IDENTITY, 1.0e-5));
        }
    }

    #[test]
    fn test_skin_matrices_identity_at_bind_pose() {
        let skeleton = two_bone();
        let mut skin = Vec::new();
        skeleton.skin_matrices(skeleton.bind_pose(), &mut skin);

        assert_eq!(skin.len(), 2);
        for matrix in &skin {
            assert!(matrix.abs_diff_eq(Mat4::IDENTITY, 1.0e-5));
        }
    }

    #[test]
    fn test_joint_lookup() {
        let skeleton = two_bone();
        assert_eq!(skeleton.joint_index("knee"), Some(1));
        assert_eq!(skeleton.joint_index("ankle"), None);
        assert_eq!(skeleton.joint_name(0), Some("hip"));
        assert_eq!(skeleton.joint_name(5), None);
    }

    #[test]
    fn test_mismatched_properties_rejected() {
        let rest = Pose::new(2);
        let bind = Pose::new(2);
        let result = Skeleton::new(rest, bind, vec!["only".into()]);
        assert!(matches!(result, Err(AnimationError::ValidationError(_))));
    }

    #[test]
    fn test_set_properties_recomputes() {
        let mut skeleton = two_bone();
        skeleton
            .set_properties(Pose::new(3), Pose::new(3), vec![String::new(); 3])
            .unwrap();
        assert_eq!(skeleton.inv_bind_pose().len(), 3);
        assert!(skeleton.inv_bind_pose()[2].abs_diff_eq(Mat4::IDENTITY, 1.0e-6));
    }
}
