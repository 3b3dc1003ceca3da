//! Transform representing position, rotation, and scale in 3D space

use super::{Point3D, Pose, Quaternion, Vector3D};

/// Decomposed 3D transform (position + rotation + scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Point3D,
    pub rotation: Quaternion,
    pub scale: Vector3D,
}

impl Transform {
    /// Identity transform (origin, no rotation, unit scale)
    pub fn identity() -> Self {
        Self {
            position: Point3D::ORIGIN,
            rotation: Quaternion::IDENTITY,
            scale: Vector3D::ONE,
        }
    }

    pub fn from_position(position: Point3D) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn from_position_rotation(position: Point3D, rotation: Quaternion) -> Self {
        Self {
            position,
            rotation,
            scale: Vector3D::ONE,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3D::ONE * scale;
        self
    }

    pub fn forward(&self) -> Vector3D {
        self.rotation.forward()
    }

    /// Transform a point from local space to world space
    pub fn transform_point(&self, local: Point3D) -> Point3D {
        let scaled = Vector3D::new(
            local.x * self.scale.x,
            local.y * self.scale.y,
            local.z * self.scale.z,
        );
        self.position + self.rotation.rotate_vector(scaled)
    }

    /// Inverse transform a point from world space to local space
    pub fn inverse_transform_point(&self, world: Point3D) -> Point3D {
        let relative = world - self.position;
        let unrotated = self.rotation.inverse().rotate_vector(relative);
        Point3D::new(
            unrotated.x / self.scale.x,
            unrotated.y / self.scale.y,
            unrotated.z / self.scale.z,
        )
    }

    /// Compose into a column-major matrix pose
    pub fn to_pose(&self) -> Pose {
        Pose::from_transform(self)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
