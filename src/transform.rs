//! Local transforms for hierarchy nodes.

use glam::{Mat4, Quat, Vec3};

/// Position, rotation and scale of a node relative to its parent.
///
/// Root nodes are positioned in world space. When a node is reparented the
/// hierarchy recomputes its local transform so that its world placement is
/// unchanged.
///
/// # Example
///
/// ```
/// use scenehop::{Quat, Transform, Vec3};
///
/// let transform = Transform::new()
///     .position(Vec3::new(0.0, 2.0, 0.0))
///     .rotation(Quat::from_rotation_y(0.5));
/// assert_eq!(transform.scale, Vec3::ONE);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation relative to the parent.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Scale factors for each axis.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates an identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transform positioned at the given location.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Decomposes an affine matrix back into a transform.
    ///
    /// Shear cannot be represented, so matrices built from non-uniformly
    /// scaled parents with rotated children only round-trip approximately.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Sets the position component.
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the rotation component.
    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets non-uniform scale factors for each axis.
    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Sets uniform scale on all axes.
    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Converts this transform to a 4×4 matrix (scale, then rotate, then translate).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Returns true if both transforms match within `epsilon` on every component.
    pub fn abs_diff_eq(&self, other: &Transform, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && self.scale.abs_diff_eq(other.scale, epsilon)
            && (self.rotation.abs_diff_eq(other.rotation, epsilon)
                || self.rotation.abs_diff_eq(-other.rotation, epsilon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_round_trip() {
        let transform = Transform::new()
            .position(Vec3::new(1.0, -2.0, 3.0))
            .rotation(Quat::from_rotation_z(0.75))
            .uniform_scale(2.0);

        let back = Transform::from_matrix(transform.matrix());
        assert!(back.abs_diff_eq(&transform, 1e-4));
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform::new().matrix(), Mat4::IDENTITY);
    }
}
