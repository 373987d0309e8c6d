//! Named animation clips

use crate::error::{AnimationError, Result};
use crate::pose::Pose;
use crate::track::wrap_time;
use crate::transform_track::TransformTrack;

/// Name given to clips that were never named
pub const DEFAULT_CLIP_NAME: &str = "empty";

/// A named set of per-bone tracks sharing one time range
///
/// A clip holds no playhead. [`Clip::sample`] returns the wrapped or clamped
/// time and callers keep it for the next frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clip {
    tracks: Vec<TransformTrack>,
    name: String,
    start_time: f32,
    end_time: f32,
    looping: bool,
}

impl Default for Clip {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            name: DEFAULT_CLIP_NAME.to_string(),
            start_time: 0.0,
            end_time: 0.0,
            looping: true,
        }
    }
}

impl Clip {
    /// Empty looping clip
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    pub fn end_time(&self) -> f32 {
        self.end_time
    }

    pub fn duration(&self) -> f32 {
        self.end_time - self.start_time
    }

    /// Number of bone tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[TransformTrack] {
        &self.tracks
    }

    /// Bone targeted by the track at `index`
    pub fn bone_id(&self, index: usize) -> u32 {
        self.tracks[index].bone_id()
    }

    pub fn set_bone_id(&mut self, index: usize, bone_id: u32) {
        self.tracks[index].set_bone_id(bone_id);
    }

    /// Track for `bone_id`, if the clip animates that bone
    pub fn find_track(&self, bone_id: u32) -> Option<&TransformTrack> {
        self.tracks.iter().find(|track| track.bone_id() == bone_id)
    }

    /// Track for `bone_id`, appending an empty one if missing
    ///
    /// Meant for building clips. Call [`Clip::recalculate_duration`] once all
    /// tracks are filled in.
    pub fn track_or_insert(&mut self, bone_id: u32) -> &mut TransformTrack {
        let index = match self.tracks.iter().position(|track| track.bone_id() == bone_id) {
            Some(index) => index,
            None => {
                self.tracks.push(TransformTrack::new(bone_id));
                self.tracks.len() - 1
            }
        };
        &mut self.tracks[index]
    }

    /// Recompute the time range from the animated tracks
    pub fn recalculate_duration(&mut self) {
        let mut range: Option<(f32, f32)> = None;

        for track in self.tracks.iter().filter(|track| track.is_valid()) {
            let (start, end) = (track.start_time(), track.end_time());
            range = Some(match range {
                Some((lo, hi)) => (lo.min(start), hi.max(end)),
                None => (start, end),
            });
        }

        let (start, end) = range.unwrap_or((0.0, 0.0));
        self.start_time = start;
        self.end_time = end;
    }

    /// Pose `pose` at `time` and return the time actually sampled
    ///
    /// Each track samples on top of the pose's current local transform for
    /// its bone. Tracks for bones outside the pose are skipped. A clip with no
    /// duration leaves the pose alone and returns 0.
    pub fn sample(&self, pose: &mut Pose, time: f32) -> f32 {
        if self.duration() == 0.0 {
            return 0.0;
        }

        let time = self.adjust_time_to_fit_range(time);
        for track in &self.tracks {
            let joint = track.bone_id() as usize;
            if joint >= pose.len() {
                continue;
            }
            let local = pose.local_transform(joint);
            let animated = track.sample(&local, time, self.looping);
            pose.set_local_transform(joint, animated);
        }

        time
    }

    /// Wrap (looping) or clamp `time` into the clip's range
    pub fn adjust_time_to_fit_range(&self, time: f32) -> f32 {
        if self.looping {
            let duration = self.duration();
            if duration <= 0.0 {
                return 0.0;
            }
            wrap_time(time, self.start_time, duration)
        } else {
            time.clamp(self.start_time, self.end_time.max(self.start_time))
        }
    }

    /// Check the clip against a skeleton with `joint_count` joints
    pub fn validate(&self, joint_count: usize) -> Result<()> {
        for track in &self.tracks {
            let joint = track.bone_id() as usize;
            if joint >= joint_count {
                return Err(AnimationError::JointOutOfRange {
                    index: joint,
                    count: joint_count,
                });
            }

            let sorted = track.position().is_sorted_by_time()
                && track.rotation().is_sorted_by_time()
                && track.scale().is_sorted_by_time();
            if !sorted {
                return Err(AnimationError::ChannelError {
                    clip: self.name.clone(),
                    reason: format!("keyframes for bone {joint} are not in time order"),
                });
            }
        }
        Ok(())
    }
}
