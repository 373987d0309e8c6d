//! Joint hierarchy with local transforms
//!
//! A [`Pose`] stores one local [`Transform`] per joint together with the
//! index of each joint's parent. Global transforms are computed on demand by
//! walking the parent chain; nothing is cached.

use glam::Mat4;

use crate::error::{AnimationError, Result};
use crate::transform::Transform;

/// Local joint transforms plus parent links
#[derive(Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    joints: Vec<Transform>,
    parents: Vec<i32>,
}

impl Clone for Pose {
    fn clone(&self) -> Self {
        Self {
            joints: self.joints.clone(),
            parents: self.parents.clone(),
        }
    }

    // Per-frame rest pose resets go through here and keep their allocations.
    fn clone_from(&mut self, source: &Self) {
        self.joints.clone_from(&source.joints);
        self.parents.clone_from(&source.parents);
    }
}

impl Pose {
    /// Pose with `joint_count` identity joints, all roots
    pub fn new(joint_count: usize) -> Self {
        Self {
            joints: vec![Transform::IDENTITY; joint_count],
            parents: vec![-1; joint_count],
        }
    }

    /// Build a pose from parallel joint and parent arrays
    pub fn from_parts(joints: Vec<Transform>, parents: Vec<i32>) -> Result<Self> {
        if joints.len() != parents.len() {
            return Err(AnimationError::ValidationError(format!(
                "pose has {} joints but {} parent links",
                joints.len(),
                parents.len()
            )));
        }
        Ok(Self { joints, parents })
    }

    /// Number of joints
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Resize both arrays; new joints are identity roots
    pub fn resize(&mut self, size: usize) {
        self.joints.resize(size, Transform::IDENTITY);
        self.parents.resize(size, -1);
    }

    pub fn local_transform(&self, index: usize) -> Transform {
        self.joints[index]
    }

    pub fn set_local_transform(&mut self, index: usize, transform: Transform) {
        self.joints[index] = transform;
    }

    /// Parent of `index`, negative for roots
    pub fn parent(&self, index: usize) -> i32 {
        self.parents[index]
    }

    pub fn set_parent(&mut self, index: usize, parent: i32) {
        self.parents[index] = parent;
    }

    /// All local transforms
    pub fn joints(&self) -> &[Transform] {
        &self.joints
    }

    /// All parent links
    pub fn parents(&self) -> &[i32] {
        &self.parents
    }

    /// Parent of `index` as an index into this pose, or `None` for roots
    ///
    /// Links that point outside the pose are treated as roots.
    fn parent_index(&self, index: usize) -> Option<usize> {
        usize::try_from(self.parents[index])
            .ok()
            .filter(|&parent| parent < self.parents.len())
    }

    /// Model-space transform of joint `index`
    ///
    /// Walks at most `len()` links, so a corrupt cyclic chain still ends.
    pub fn global_transform(&self, index: usize) -> Transform {
        let mut result = self.joints[index];
        let mut current = index;

        for _ in 0..self.joints.len() {
            let Some(parent) = self.parent_index(current) else {
                break;
            };
            result = Transform::combine(&self.joints[parent], &result);
            current = parent;
        }

        result
    }

    /// Fill `out` with the global matrix of every joint
    pub fn matrix_palette(&self, out: &mut Vec<Mat4>) {
        out.clear();
        out.extend((0..self.joints.len()).map(|i| self.global_transform(i).to_mat4()));
    }

    /// True if `search` is `parent` or lies below it in the hierarchy
    pub fn is_in_hierarchy(&self, parent: usize, search: usize) -> bool {
        if search == parent {
            return true;
        }

        let mut current = search;
        for _ in 0..self.joints.len() {
            match self.parent_index(current) {
                Some(next) if next == parent => return true,
                Some(next) => current = next,
                None => return false,
            }
        }
        false
    }

    /// Blend `start` toward `end` into `output`
    ///
    /// With a `blend_root`, joints outside that subtree are left untouched in
    /// `output`, so `output` must already hold a complete pose.
    pub fn blend(output: &mut Self, start: &Self, end: &Self, t: f32, blend_root: Option<usize>) {
        let count = output.len().min(start.len()).min(end.len());
        for i in 0..count {
            if let Some(root) = blend_root
                && !output.is_in_hierarchy(root, i)
            {
                continue;
            }
            output.joints[i] = Transform::mix(&start.joints[i], &end.joints[i], t);
        }
    }

    /// In-place form of [`Pose::blend`] with `self` as both output and start
    pub fn blend_toward(&mut self, end: &Self, t: f32, blend_root: Option<usize>) {
        let count = self.len().min(end.len());
        for i in 0..count {
            if let Some(root) = blend_root
                && !self.is_in_hierarchy(root, i)
            {
                continue;
            }
            self.joints[i] = Transform::mix(&self.joints[i], &end.joints[i], t);
        }
    }

    /// Check that every parent link is in range and the hierarchy is acyclic
    pub fn validate(&self) -> Result<()> {
        let count = self.parents.len();
        for &parent in &self.parents {
            if parent >= 0 && parent as usize >= count {
                return Err(AnimationError::JointOutOfRange {
                    index: parent as usize,
                    count,
                });
            }
        }

        for start in 0..count {
            let mut current = start;
            let mut steps = 0;
            while let Some(parent) = self.parent_index(current) {
                steps += 1;
                if parent == start || steps > count {
                    return Err(AnimationError::ValidationError(format!(
                        "joint {start} is its own ancestor"
                    )));
                }
                current = parent;
            }
        }

        Ok(())
    }
}
