//! Translation/rotation/scale transforms for skeletal joints
//!
//! A [`Transform`] is the unit every pose is built from. Composition follows
//! the usual parent-then-child order: scale, then rotate, then translate.

use glam::{Mat4, Quat, Vec3};

/// Scale components smaller than this are treated as zero when inverting.
const SCALE_EPSILON: f32 = 1.0e-6;

/// Local or global joint transform
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    /// Translation
    pub position: Vec3,
    /// Rotation (unit quaternion)
    pub rotation: Quat,
    /// Non-uniform scale
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (no translation, no rotation, unit scale)
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new transform
    pub const fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Create a transform that only translates
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Express `child` in the space of `parent`
    pub fn combine(parent: &Self, child: &Self) -> Self {
        Self {
            position: parent.position + parent.rotation * (parent.scale * child.position),
            rotation: (parent.rotation * child.rotation).normalize(),
            scale: parent.scale * child.scale,
        }
    }

    /// Inverse transform, so that `combine(t, inverse(t))` is the identity
    ///
    /// Degenerate scale axes invert to zero instead of infinity.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        let scale = Vec3::new(
            safe_recip(self.scale.x),
            safe_recip(self.scale.y),
            safe_recip(self.scale.z),
        );
        let position = rotation * (scale * -self.position);

        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Blend two transforms
    ///
    /// Position and scale are interpolated linearly. Rotation uses a
    /// normalized lerp along the shortest arc.
    pub fn mix(start: &Self, end: &Self, t: f32) -> Self {
        let mut end_rotation = end.rotation;
        if start.rotation.dot(end_rotation) < 0.0 {
            end_rotation = -end_rotation;
        }

        Self {
            position: start.position.lerp(end.position, t),
            rotation: nlerp(start.rotation, end_rotation, t),
            scale: start.scale.lerp(end.scale, t),
        }
    }

    /// Convert to a column-major matrix
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Decompose an affine matrix into a transform
    ///
    /// Shear is discarded.
    pub fn from_mat4(matrix: &Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation: rotation.normalize(),
            scale,
        }
    }

    /// Transform a point (applies translation)
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * point)
    }

    /// Transform a direction (ignores translation)
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform> for Mat4 {
    fn from(transform: Transform) -> Self {
        transform.to_mat4()
    }
}

/// Component-wise lerp followed by normalization
pub(crate) fn nlerp(start: Quat, end: Quat, t: f32) -> Quat {
    (start * (1.0 - t) + end * t).normalize()
}

fn safe_recip(value: f32) -> f32 {
    if value.abs() < SCALE_EPSILON {
        0.0
    } else {
        1.0 / value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec3_near(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected).length() < 1.0e-4,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn test_combine_matches_matrix_product() {
        let parent = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(FRAC_PI_2),
            Vec3::splat(2.0),
        );
        let child = Transform::from_position(Vec3::new(0.0, 0.0, 1.0));

        let combined = Transform::combine(&parent, &child);
        let via_matrix = parent.to_mat4() * child.to_mat4();

        assert_vec3_near(combined.position, via_matrix.w_axis.truncate());
        // +Z rotated a quarter turn about Y lands on +X, doubled by the parent scale.
        assert_vec3_near(combined.position, Vec3::new(3.0, 2.0, 3.0));
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = Transform::new(
            Vec3::new(-4.0, 0.5, 2.0),
            Quat::from_rotation_z(0.7),
            Vec3::splat(2.0),
        );
        let identity = Transform::combine(&t, &t.inverse());

        assert_vec3_near(identity.position, Vec3::ZERO);
        assert_vec3_near(identity.scale, Vec3::ONE);
        assert!(identity.rotation.dot(Quat::IDENTITY).abs() > 0.9999);
    }

    #[test]
    fn test_inverse_zero_scale() {
        let t = Transform::new(Vec3::ZERO, Quat::IDENTITY, Vec3::new(0.0, 2.0, 1.0));
        let inv = t.inverse();
        assert_eq!(inv.scale, Vec3::new(0.0, 0.5, 1.0));
    }

    #[test]
    fn test_mix_takes_short_arc() {
        let start = Transform::IDENTITY;
        let mut end = Transform::IDENTITY;
        // Same orientation as identity, opposite hemisphere.
        end.rotation = -Quat::IDENTITY;
        end.position = Vec3::new(2.0, 0.0, 0.0);

        let mid = Transform::mix(&start, &end, 0.5);
        assert_vec3_near(mid.position, Vec3::new(1.0, 0.0, 0.0));
        assert!(mid.rotation.dot(Quat::IDENTITY) > 0.9999);
    }

    #[test]
    fn test_matrix_round_trip() {
        let t = Transform::new(
            Vec3::new(1.0, -2.0, 3.0),
            Quat::from_rotation_x(0.3),
            Vec3::new(1.5, 1.5, 1.5),
        );
        let back = Transform::from_mat4(&t.to_mat4());

        assert_vec3_near(back.position, t.position);
        assert_vec3_near(back.scale, t.scale);
        assert!(back.rotation.dot(t.rotation).abs() > 0.9999);
    }

    #[test]
    fn test_transform_point_and_vector() {
        let t = Transform::new(
            Vec3::new(0.0, 1.0, 0.0),
            Quat::from_rotation_z(FRAC_PI_2),
            Vec3::ONE,
        );
        assert_vec3_near(t.transform_point(Vec3::X), Vec3::new(0.0, 2.0, 0.0));
        assert_vec3_near(t.transform_vector(Vec3::X), Vec3::Y);
    }
}
