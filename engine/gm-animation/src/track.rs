//! Keyframe tracks for scalar, vector and quaternion channels

use std::ops::{Index, IndexMut};

use glam::{Quat, Vec3};

use crate::interpolation::{Interpolation, TrackValue, hermite};

/// A single sample point on a track
///
/// The tangents are only read for [`Interpolation::Cubic`] and are stored in
/// units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe<T> {
    /// Value at `time`
    pub value: T,
    /// Incoming tangent
    pub in_tangent: T,
    /// Outgoing tangent
    pub out_tangent: T,
    /// Time stamp in seconds
    pub time: f32,
}

impl<T: TrackValue> Keyframe<T> {
    /// Keyframe with zero tangents
    pub fn new(time: f32, value: T) -> Self {
        Self {
            value,
            in_tangent: T::default(),
            out_tangent: T::default(),
            time,
        }
    }

    /// Keyframe with explicit Hermite tangents
    pub fn with_tangents(time: f32, value: T, in_tangent: T, out_tangent: T) -> Self {
        Self {
            value,
            in_tangent,
            out_tangent,
            time,
        }
    }
}

/// Time-ordered keyframes for one animated channel
///
/// Keyframe times must increase. Tracks with fewer than two keyframes are
/// degenerate and always sample to `T::default()`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track<T> {
    frames: Vec<Keyframe<T>>,
    interpolation: Interpolation,
}

/// Track of single floats
pub type ScalarTrack = Track<f32>;
/// Track of 3-vectors (translation or scale)
pub type VectorTrack = Track<Vec3>;
/// Track of rotations
pub type QuaternionTrack = Track<Quat>;

impl<T: TrackValue> Track<T> {
    /// Empty linear track
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            interpolation: Interpolation::Linear,
        }
    }

    /// Build a track from keyframes that are already in time order
    pub fn from_keyframes(frames: Vec<Keyframe<T>>, interpolation: Interpolation) -> Self {
        Self {
            frames,
            interpolation,
        }
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if the track has no keyframes
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Resize the keyframe array, filling with default keyframes
    pub fn resize(&mut self, size: usize) {
        self.frames.resize(size, Keyframe::default());
    }

    /// Append a keyframe
    pub fn push(&mut self, frame: Keyframe<T>) {
        self.frames.push(frame);
    }

    /// All keyframes in order
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.frames
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Time of the first keyframe, or 0 for an empty track
    pub fn start_time(&self) -> f32 {
        self.frames.first().map_or(0.0, |f| f.time)
    }

    /// Time of the last keyframe, or 0 for an empty track
    pub fn end_time(&self) -> f32 {
        self.frames.last().map_or(0.0, |f| f.time)
    }

    /// True if keyframe times are strictly increasing
    pub fn is_sorted_by_time(&self) -> bool {
        self.frames.windows(2).all(|w| w[0].time < w[1].time)
    }

    /// Sample the track at `time`
    pub fn sample(&self, time: f32, looping: bool) -> T {
        match self.interpolation {
            Interpolation::Constant => self.sample_constant(time, looping),
            Interpolation::Linear => self.sample_linear(time, looping),
            Interpolation::Cubic => self.sample_cubic(time, looping),
        }
    }

    /// Index of the keyframe that starts the segment containing `time`
    ///
    /// The result is always below `len() - 1`, so `index + 1` is valid.
    /// Returns `None` for tracks with fewer than two keyframes.
    pub fn frame_index(&self, time: f32, looping: bool) -> Option<usize> {
        let size = self.frames.len();
        if size <= 1 {
            return None;
        }

        let last_segment = size - 2;
        let time = if looping {
            let start = self.frames[0].time;
            let duration = self.frames[size - 1].time - start;
            wrap_time(time, start, duration)
        } else {
            if time <= self.frames[0].time {
                return Some(0);
            }
            if time >= self.frames[last_segment].time {
                return Some(last_segment);
            }
            time
        };

        // Last keyframe at or before `time`
        let index = self
            .frames
            .partition_point(|frame| frame.time <= time)
            .saturating_sub(1);

        Some(index.min(last_segment))
    }

    /// Wrap or clamp `time` into the range covered by the track
    ///
    /// Returns 0 for degenerate tracks.
    pub fn adjust_time_to_fit_track(&self, time: f32, looping: bool) -> f32 {
        let size = self.frames.len();
        if size <= 1 {
            return 0.0;
        }

        let start = self.frames[0].time;
        let end = self.frames[size - 1].time;
        let duration = end - start;
        if duration <= 0.0 {
            return 0.0;
        }

        if looping {
            wrap_time(time, start, duration)
        } else {
            time.clamp(start, end)
        }
    }

    fn sample_constant(&self, time: f32, looping: bool) -> T {
        match self.frame_index(time, looping) {
            Some(index) => T::from_keyframe(self.frames[index].value),
            None => T::default(),
        }
    }

    fn sample_linear(&self, time: f32, looping: bool) -> T {
        let Some((this, next, t)) = self.segment(time, looping) else {
            return T::default();
        };

        let start = T::from_keyframe(this.value);
        let end = T::from_keyframe(next.value);
        T::interpolate(start, end, t)
    }

    fn sample_cubic(&self, time: f32, looping: bool) -> T {
        let Some((this, next, t)) = self.segment(time, looping) else {
            return T::default();
        };
        let frame_delta = next.time - this.time;

        let point1 = T::from_keyframe(this.value);
        let point2 = T::from_keyframe(next.value);
        // Tangents are per second; the spline parameter spans one segment.
        let slope1 = this.out_tangent * frame_delta;
        let slope2 = next.in_tangent * frame_delta;

        hermite(t, point1, slope1, point2, slope2)
    }

    /// Bracketing keyframes and the normalized position between them
    fn segment(&self, time: f32, looping: bool) -> Option<(&Keyframe<T>, &Keyframe<T>, f32)> {
        let index = self.frame_index(time, looping)?;
        let this = &self.frames[index];
        let next = &self.frames[index + 1];

        let frame_delta = next.time - this.time;
        if frame_delta <= 0.0 {
            return None;
        }

        let track_time = self.adjust_time_to_fit_track(time, looping);
        let t = (track_time - this.time) / frame_delta;
        Some((this, next, t))
    }
}

impl<T> Index<usize> for Track<T> {
    type Output = Keyframe<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.frames[index]
    }
}

impl<T> IndexMut<usize> for Track<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.frames[index]
    }
}

/// Floored modulo of `time` into `[start, start + duration)`
pub(crate) fn wrap_time(time: f32, start: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return start;
    }
    let mut wrapped = (time - start) % duration;
    if wrapped < 0.0 {
        wrapped += duration;
    }
    wrapped + start
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn linear_vec3() -> VectorTrack {
        Track::from_keyframes(
            vec![
                Keyframe::new(0.0, Vec3::ZERO),
                Keyframe::new(1.0, Vec3::new(0.0, 1.0, 0.0)),
            ],
            Interpolation::Linear,
        )
    }

    fn scalar_track(times: &[f32], interpolation: Interpolation) -> ScalarTrack {
        let frames = times
            .iter()
            .enumerate()
            .map(|(i, &time)| Keyframe::new(time, i as f32 * 10.0))
            .collect();
        Track::from_keyframes(frames, interpolation)
    }

    #[test]
    fn test_linear_endpoints_are_exact() {
        let track = linear_vec3();
        assert_eq!(track.sample(0.0, false), Vec3::ZERO);
        assert_eq!(track.sample(1.0, false), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(track.sample(0.5, false), Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_looping_wraps() {
        let track = linear_vec3();
        let wrapped = track.sample(1.3, true);
        let direct = track.sample(0.3, true);
        assert!((wrapped - direct).length() < 1.0e-5);

        let negative = track.sample(-0.7, true);
        assert!((negative - direct).length() < 1.0e-5);
    }

    #[test]
    fn test_non_looping_clamps() {
        let track = linear_vec3();
        assert_eq!(track.sample(-5.0, false), Vec3::ZERO);
        assert_eq!(track.sample(5.0, false), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test_case(0 ; "empty")]
    #[test_case(1 ; "single keyframe")]
    fn test_degenerate_tracks_sample_default(count: usize) {
        let mut track = QuaternionTrack::new();
        for i in 0..count {
            track.push(Keyframe::new(i as f32, Quat::from_rotation_x(1.0)));
        }
        assert_eq!(track.frame_index(0.5, false), None);
        assert_eq!(track.adjust_time_to_fit_track(0.5, true), 0.0);
        // The default quaternion is the identity, so degenerate rotation
        // tracks leave orientation untouched.
        assert_eq!(track.sample(0.5, true), Quat::IDENTITY);
    }

    #[test_case(-1.0, false, Some(0) ; "before start clamps to first")]
    #[test_case(0.0, false, Some(0) ; "at start")]
    #[test_case(1.5, false, Some(1) ; "middle segment")]
    #[test_case(2.0, false, Some(2) ; "at second to last")]
    #[test_case(9.0, false, Some(2) ; "past end clamps to last segment")]
    #[test_case(4.5, true, Some(1) ; "looping wraps into middle")]
    #[test_case(-0.5, true, Some(2) ; "looping negative wraps to tail")]
    fn test_frame_index(time: f32, looping: bool, expected: Option<usize>) {
        let track = scalar_track(&[0.0, 1.0, 2.0, 3.0], Interpolation::Linear);
        assert_eq!(track.frame_index(time, looping), expected);
    }

    #[test]
    fn test_adjust_time_to_fit_track() {
        let track = scalar_track(&[1.0, 3.0], Interpolation::Linear);
        assert_eq!(track.adjust_time_to_fit_track(0.0, false), 1.0);
        assert_eq!(track.adjust_time_to_fit_track(4.0, false), 3.0);
        assert!((track.adjust_time_to_fit_track(3.5, true) - 1.5).abs() < 1.0e-6);
        assert!((track.adjust_time_to_fit_track(0.5, true) - 2.5).abs() < 1.0e-6);
    }

    #[test]
    fn test_zero_duration_track() {
        let track = scalar_track(&[2.0, 2.0], Interpolation::Linear);
        assert_eq!(track.adjust_time_to_fit_track(2.0, true), 0.0);
        assert_eq!(track.sample(2.0, false), 0.0);
    }

    #[test]
    fn test_constant_holds_previous_value() {
        let track = scalar_track(&[0.0, 1.0, 2.0], Interpolation::Constant);
        assert_eq!(track.sample(0.99, false), 0.0);
        assert_eq!(track.sample(1.0, false), 10.0);
        assert_eq!(track.sample(1.7, false), 10.0);
    }

    #[test]
    fn test_quaternion_linear_takes_short_arc() {
        let a = Quat::from_rotation_z(0.2);
        // Same rotation as 0.6 rad about Z, stored in the opposite hemisphere.
        let b = -Quat::from_rotation_z(0.6);
        assert!(a.dot(b) < 0.0);

        let track = QuaternionTrack::from_keyframes(
            vec![Keyframe::new(0.0, a), Keyframe::new(1.0, b)],
            Interpolation::Linear,
        );

        let mut previous_angle = 0.0;
        for step in 0..=10 {
            let q = track.sample(step as f32 / 10.0, false);
            assert!(q.w > 0.0, "left the short arc at step {step}");
            let angle = q.angle_between(Quat::from_rotation_z(0.2));
            assert!(angle + 1.0e-4 >= previous_angle);
            previous_angle = angle;
        }
        let mid = track.sample(0.5, false);
        assert!(mid.angle_between(Quat::from_rotation_z(0.4)) < 1.0e-3);
    }

    #[test]
    fn test_quaternion_cubic_takes_short_arc() {
        let a = Quat::from_rotation_y(0.1);
        let b = -Quat::from_rotation_y(0.5);

        let zero = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);

        let track = QuaternionTrack::from_keyframes(
            vec![
                Keyframe::with_tangents(0.0, a, zero, zero),
                Keyframe::with_tangents(1.0, b, zero, zero),
            ],
            Interpolation::Cubic,
        );

        let q = track.sample(0.5, false);
        assert!((q.length() - 1.0).abs() < 1.0e-5);
        assert!(q.angle_between(Quat::from_rotation_y(0.3)) < 1.0e-3);
    }

    #[test]
    fn test_cubic_tangents_scale_with_frame_delta() {
        // Slope of 1 unit per second over a 2 second segment.
        let track = ScalarTrack::from_keyframes(
            vec![
                Keyframe::with_tangents(0.0, 0.0, 1.0, 1.0),
                Keyframe::with_tangents(2.0, 2.0, 1.0, 1.0),
            ],
            Interpolation::Cubic,
        );

        // A straight line written as a Hermite spline stays a straight line.
        for step in 0..=8 {
            let time = step as f32 * 0.25;
            assert!((track.sample(time, false) - time).abs() < 1.0e-5);
        }
    }

    #[test]
    fn test_sorted_by_time() {
        assert!(scalar_track(&[0.0, 1.0, 2.0], Interpolation::Linear).is_sorted_by_time());
        assert!(!scalar_track(&[0.0, 2.0, 1.0], Interpolation::Linear).is_sorted_by_time());
        // Repeated times are not strictly increasing.
        assert!(!scalar_track(&[0.0, 1.0, 1.0], Interpolation::Linear).is_sorted_by_time());
    }

    #[test]
    fn test_resize_and_index_mut() {
        let mut track = VectorTrack::new();
        track.resize(2);
        track[1].time = 0.5;
        track[1].value = Vec3::X;
        assert_eq!(track.len(), 2);
        assert_eq!(track.end_time(), 0.5);
        assert_eq!(track.sample(0.25, false), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_wrap_time() {
        assert!((wrap_time(2.25, 0.0, 1.0) - 0.25).abs() < 1.0e-6);
        assert!((wrap_time(-0.25, 0.0, 1.0) - 0.75).abs() < 1.0e-6);
        assert_eq!(wrap_time(5.0, 1.0, 0.0), 1.0);
    }
}
