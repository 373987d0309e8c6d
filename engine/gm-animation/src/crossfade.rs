//! Cross-fade playback between clips
//!
//! A [`CrossFadeController`] plays one current clip and keeps a queue of fade
//! targets. Every target advances its own playhead and the output pose is
//! blended toward each of them in queue order, so overlapping fades compound.
//! When a target's fade completes it becomes the current clip.
//!
//! Clips are shared through [`Arc`] and compared by pointer identity, so the
//! same clip table can drive any number of controllers.

use std::sync::Arc;

use crate::clip::Clip;
use crate::error::{AnimationError, Result};
use crate::pose::Pose;
use crate::skeleton::Skeleton;

/// A clip being faded in
#[derive(Debug, Clone)]
pub struct CrossFadeTarget {
    /// Clip being faded in
    pub clip: Arc<Clip>,
    /// Working pose sampled from `clip`
    pub pose: Pose,
    /// Playhead within `clip`
    pub time: f32,
    /// Total fade length in seconds
    pub duration: f32,
    /// Seconds faded so far
    pub elapsed: f32,
}

impl CrossFadeTarget {
    /// New target starting at the clip's first frame
    pub fn new(clip: Arc<Clip>, pose: Pose, duration: f32) -> Self {
        let time = clip.start_time();
        Self {
            clip,
            pose,
            time,
            duration,
            elapsed: 0.0,
        }
    }

    /// Blend weight of this target, from 0 to 1
    ///
    /// A fade with no duration is complete immediately.
    pub fn weight(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }

    /// True once the fade has run its full duration
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Plays clips on one skeleton and fades between them
#[derive(Debug, Clone, Default)]
pub struct CrossFadeController {
    targets: Vec<CrossFadeTarget>,
    clip: Option<Arc<Clip>>,
    time: f32,
    pose: Pose,
    skeleton: Option<Arc<Skeleton>>,
}

impl CrossFadeController {
    /// Controller bound to `skeleton`, with nothing playing
    pub fn new(skeleton: Arc<Skeleton>) -> Self {
        let mut controller = Self::default();
        controller.set_skeleton(skeleton);
        controller
    }

    /// Bind a skeleton and reset the output pose to its rest pose
    pub fn set_skeleton(&mut self, skeleton: Arc<Skeleton>) {
        self.pose.clone_from(skeleton.rest_pose());
        self.skeleton = Some(skeleton);
    }

    pub fn skeleton(&self) -> Option<&Arc<Skeleton>> {
        self.skeleton.as_ref()
    }

    /// Output pose of the last update
    pub fn current_pose(&self) -> &Pose {
        &self.pose
    }

    pub fn current_clip(&self) -> Option<&Arc<Clip>> {
        self.clip.as_ref()
    }

    /// Playhead within the current clip
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Pending fades in queue order
    pub fn targets(&self) -> &[CrossFadeTarget] {
        &self.targets
    }

    pub fn is_fading(&self) -> bool {
        !self.targets.is_empty()
    }

    /// Cut to `clip` immediately, dropping any pending fades
    pub fn play(&mut self, clip: Arc<Clip>) -> Result<()> {
        let skeleton = self.skeleton.as_ref().ok_or(AnimationError::SkeletonNotSet)?;

        log::debug!("Playing clip '{}'", clip.name());
        self.targets.clear();
        self.pose.clone_from(skeleton.rest_pose());
        self.time = clip.start_time();
        self.clip = Some(clip);
        Ok(())
    }

    /// Queue a fade to `clip` over `fade_time` seconds
    ///
    /// With nothing playing this is a [`play`](Self::play). Requests for the
    /// clip that is already the last fade destination (or the current clip
    /// when no fade is pending) are ignored.
    pub fn fade_to(&mut self, clip: Arc<Clip>, fade_time: f32) -> Result<()> {
        let skeleton = self.skeleton.as_ref().ok_or(AnimationError::SkeletonNotSet)?;

        let Some(current) = &self.clip else {
            return self.play(clip);
        };

        let destination = self.targets.last().map_or(current, |target| &target.clip);
        if Arc::ptr_eq(destination, &clip) {
            return Ok(());
        }

        log::debug!(
            "Queued fade to clip '{}' over {:.3}s ({} pending)",
            clip.name(),
            fade_time,
            self.targets.len() + 1
        );
        let pose = skeleton.rest_pose().clone();
        self.targets.push(CrossFadeTarget::new(clip, pose, fade_time));
        Ok(())
    }

    /// Advance playback by `delta_seconds`
    ///
    /// Does nothing until a skeleton is set and a clip is playing. At most one
    /// completed fade is promoted per call.
    pub fn update(&mut self, delta_seconds: f32) {
        let Some(skeleton) = &self.skeleton else {
            return;
        };
        if self.clip.is_none() {
            return;
        }

        if let Some(index) = self.targets.iter().position(CrossFadeTarget::is_complete) {
            let target = self.targets.remove(index);
            log::debug!("Fade to clip '{}' complete", target.clip.name());
            self.time = target.time;
            self.pose = target.pose;
            self.clip = Some(target.clip);
        }

        let Some(clip) = &self.clip else {
            return;
        };
        self.pose.clone_from(skeleton.rest_pose());
        self.time = clip.sample(&mut self.pose, self.time + delta_seconds);

        for target in &mut self.targets {
            target.time = target.clip.sample(&mut target.pose, target.time + delta_seconds);
            target.elapsed += delta_seconds;
            self.pose.blend_toward(&target.pose, target.weight(), None);
        }
    }
}
