//! Interpolation modes and the per-type rules tracks sample with

use std::ops::{Add, Mul};

use glam::{Quat, Vec3};

/// How a track moves between two keyframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolation {
    /// Hold the value of the keyframe at or before the sample time
    Constant,
    /// Straight blend between the bracketing keyframes
    #[default]
    Linear,
    /// Hermite spline through the bracketing keyframes and their tangents
    Cubic,
}

impl From<gltf::animation::Interpolation> for Interpolation {
    fn from(value: gltf::animation::Interpolation) -> Self {
        match value {
            gltf::animation::Interpolation::Step => Self::Constant,
            gltf::animation::Interpolation::Linear => Self::Linear,
            gltf::animation::Interpolation::CubicSpline => Self::Cubic,
        }
    }
}

/// Value types a [`Track`](crate::track::Track) can hold
///
/// Vectors and scalars use the defaults. Quaternions override them so that
/// keyframes stay unit length and blends take the short arc.
pub trait TrackValue: Copy + Default + Add<Output = Self> + Mul<f32, Output = Self> {
    /// Value as it is read out of a keyframe
    fn from_keyframe(value: Self) -> Self {
        value
    }

    /// Linear interpolation between two keyframe values
    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        start * (1.0 - t) + end * t
    }

    /// Flip `end` into the neighborhood of `start` before a spline blend
    fn neighborhood(_start: Self, end: Self) -> Self {
        end
    }

    /// Post-process a Hermite spline result
    fn adjust_hermite(value: Self) -> Self {
        value
    }
}

impl TrackValue for f32 {}

impl TrackValue for Vec3 {
    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl TrackValue for Quat {
    fn from_keyframe(value: Self) -> Self {
        value.normalize()
    }

    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        let end = Self::neighborhood(start, end);
        crate::transform::nlerp(start, end, t)
    }

    fn neighborhood(start: Self, end: Self) -> Self {
        if start.dot(end) < 0.0 { -end } else { end }
    }

    fn adjust_hermite(value: Self) -> Self {
        value.normalize()
    }
}

/// Cubic Hermite spline at parameter `t` in `[0, 1]`
///
/// The slopes must already be scaled by the duration of the segment.
pub fn hermite<T: TrackValue>(t: f32, point1: T, slope1: T, point2: T, slope2: T) -> T {
    let tt = t * t;
    let ttt = tt * t;

    let point2 = T::neighborhood(point1, point2);

    let h1 = 2.0 * ttt - 3.0 * tt + 1.0;
    let h2 = -2.0 * ttt + 3.0 * tt;
    let h3 = ttt - 2.0 * tt + t;
    let h4 = ttt - tt;

    let result = point1 * h1 + point2 * h2 + slope1 * h3 + slope2 * h4;
    T::adjust_hermite(result)
}
