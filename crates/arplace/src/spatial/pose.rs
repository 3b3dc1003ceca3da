//! 4x4 pose matrix as exchanged with the AR platform and renderer

use std::ops::Mul;

use super::{Point3D, Quaternion, Transform, Vector3D};

/// A rigid or similarity transform stored as a column-major 4x4 matrix,
/// the layout hit-test results and render nodes use.
///
/// Poses are immutable snapshots: copying one out of the reticle and holding
/// it across frames never observes later reticle movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    m: [f32; 16],
}

impl Pose {
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn from_cols_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    pub fn to_cols_array(&self) -> [f32; 16] {
        self.m
    }

    pub fn from_translation(position: Point3D) -> Self {
        Transform::from_position(position).to_pose()
    }

    /// Compose translation * rotation * scale
    pub fn from_transform(t: &Transform) -> Self {
        let x = t.rotation.rotate_vector(Vector3D::RIGHT) * t.scale.x;
        let y = t.rotation.rotate_vector(Vector3D::UP) * t.scale.y;
        let z = t.rotation.rotate_vector(-Vector3D::FORWARD) * t.scale.z;
        let p = t.position;
        Self {
            m: [
                x.x, x.y, x.z, 0.0, //
                y.x, y.y, y.z, 0.0, //
                z.x, z.y, z.z, 0.0, //
                p.x, p.y, p.z, 1.0,
            ],
        }
    }

    /// Element at `row`, `col`
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[col * 4 + row]
    }

    fn column(&self, col: usize) -> Vector3D {
        Vector3D::new(self.m[col * 4], self.m[col * 4 + 1], self.m[col * 4 + 2])
    }

    pub fn translation(&self) -> Point3D {
        Point3D::new(self.m[12], self.m[13], self.m[14])
    }

    pub fn scale(&self) -> Vector3D {
        Vector3D::new(
            self.column(0).magnitude(),
            self.column(1).magnitude(),
            self.column(2).magnitude(),
        )
    }

    pub fn rotation(&self) -> Quaternion {
        Quaternion::from_basis(
            self.column(0).normalize(),
            self.column(1).normalize(),
            self.column(2).normalize(),
        )
    }

    /// Decompose back into position, rotation and scale
    pub fn to_transform(&self) -> Transform {
        Transform {
            position: self.translation(),
            rotation: self.rotation(),
            scale: self.scale(),
        }
    }

    pub fn transform_point(&self, p: Point3D) -> Point3D {
        let x = self.get(0, 0) * p.x + self.get(0, 1) * p.y + self.get(0, 2) * p.z + self.get(0, 3);
        let y = self.get(1, 0) * p.x + self.get(1, 1) * p.y + self.get(1, 2) * p.z + self.get(1, 3);
        let z = self.get(2, 0) * p.x + self.get(2, 1) * p.y + self.get(2, 2) * p.z + self.get(2, 3);
        Point3D::new(x, y, z)
    }

    /// Element-wise comparison with tolerance
    pub fn approx_eq(&self, other: &Pose, epsilon: f32) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform> for Pose {
    fn from(t: Transform) -> Self {
        Pose::from_transform(&t)
    }
}

impl Mul for Pose {
    type Output = Pose;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut m = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                m[col * 4 + row] = (0..4).map(|k| self.get(row, k) * rhs.get(k, col)).sum();
            }
        }
        Pose { m }
    }
}
