//! Per-bone position/rotation/scale tracks

use crate::track::{QuaternionTrack, VectorTrack};
use crate::transform::Transform;

/// The three animated channels of one bone
///
/// Only channels with at least two keyframes are applied when sampling, so a
/// clip can animate a subset of channels and leave the rest at their base
/// values.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformTrack {
    bone_id: u32,
    position: VectorTrack,
    rotation: QuaternionTrack,
    scale: VectorTrack,
}

impl TransformTrack {
    /// Empty track set for `bone_id`
    pub fn new(bone_id: u32) -> Self {
        Self {
            bone_id,
            ..Self::default()
        }
    }

    pub fn bone_id(&self) -> u32 {
        self.bone_id
    }

    pub fn set_bone_id(&mut self, bone_id: u32) {
        self.bone_id = bone_id;
    }

    pub fn position(&self) -> &VectorTrack {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut VectorTrack {
        &mut self.position
    }

    pub fn rotation(&self) -> &QuaternionTrack {
        &self.rotation
    }

    pub fn rotation_mut(&mut self) -> &mut QuaternionTrack {
        &mut self.rotation
    }

    pub fn scale(&self) -> &VectorTrack {
        &self.scale
    }

    pub fn scale_mut(&mut self) -> &mut VectorTrack {
        &mut self.scale
    }

    /// True if any channel has enough keyframes to animate
    pub fn is_valid(&self) -> bool {
        self.position.len() > 1 || self.rotation.len() > 1 || self.scale.len() > 1
    }

    /// Earliest keyframe time over the animated channels, 0 if none
    pub fn start_time(&self) -> f32 {
        self.channel_times()
            .map(|(start, _)| start)
            .reduce(f32::min)
            .unwrap_or(0.0)
    }

    /// Latest keyframe time over the animated channels, 0 if none
    pub fn end_time(&self) -> f32 {
        self.channel_times()
            .map(|(_, end)| end)
            .reduce(f32::max)
            .unwrap_or(0.0)
    }

    /// Sample on top of `base`, overriding only the animated channels
    pub fn sample(&self, base: &Transform, time: f32, looping: bool) -> Transform {
        let mut result = *base;

        if self.position.len() > 1 {
            result.position = self.position.sample(time, looping);
        }
        if self.rotation.len() > 1 {
            result.rotation = self.rotation.sample(time, looping);
        }
        if self.scale.len() > 1 {
            result.scale = self.scale.sample(time, looping);
        }

        result
    }

    fn channel_times(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        let position = (self.position.len() > 1)
            .then(|| (self.position.start_time(), self.position.end_time()));
        let rotation = (self.rotation.len() > 1)
            .then(|| (self.rotation.start_time(), self.rotation.end_time()));
        let scale =
            (self.scale.len() > 1).then(|| (self.scale.start_time(), self.scale.end_time()));

        [position, rotation, scale].into_iter().flatten()
    }
}
