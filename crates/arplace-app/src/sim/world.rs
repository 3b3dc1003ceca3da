//! The simulated room the depth sensor sees

use arplace::{Point3D, Vector3D};

/// Height of the device above the floor when a session starts
pub const EYE_HEIGHT: f32 = 1.4;

/// Axis-aligned XZ extent of a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Extent {
    pub fn contains(&self, x: f32, z: f32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_z..=self.max_z).contains(&z)
    }
}

/// Horizontal surface at a fixed height in the tracking space
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub name: String,
    pub height: f32,
    pub extent: Extent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub distance: f32,
    pub point: Point3D,
    pub surface: usize,
}

#[derive(Debug, Clone)]
pub struct SimWorld {
    surfaces: Vec<Surface>,
    max_range: f32,
}

impl SimWorld {
    pub fn new(surfaces: Vec<Surface>) -> Self {
        Self {
            surfaces,
            max_range: 8.0,
        }
    }

    /// A floor with a small table in front of the starting position
    pub fn room() -> Self {
        Self::new(vec![
            Surface {
                name: "floor".to_string(),
                height: -EYE_HEIGHT,
                extent: Extent {
                    min_x: -3.0,
                    max_x: 3.0,
                    min_z: -6.0,
                    max_z: 2.0,
                },
            },
            Surface {
                name: "table".to_string(),
                height: -0.65,
                extent: Extent {
                    min_x: -0.5,
                    max_x: 0.5,
                    min_z: -2.2,
                    max_z: -1.4,
                },
            },
        ])
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Every surface the ray crosses within range, nearest first
    pub fn raycast(&self, origin: Point3D, direction: Vector3D) -> Vec<SurfaceHit> {
        let direction = direction.normalize();
        if direction.y.abs() < 1e-6 {
            return Vec::new();
        }

        let mut hits: Vec<SurfaceHit> = self
            .surfaces
            .iter()
            .enumerate()
            .filter_map(|(index, surface)| {
                let distance = (surface.height - origin.y) / direction.y;
                if distance <= 0.0 || distance > self.max_range {
                    return None;
                }
                let point = origin + direction * distance;
                surface.extent.contains(point.x, point.z).then_some(SurfaceHit {
                    distance,
                    point,
                    surface: index,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Grid points on every surface, standing in for the camera passthrough
    pub fn backdrop(&self, spacing: f32) -> Vec<Point3D> {
        let spacing = spacing.max(0.05);
        let mut points = Vec::new();
        for surface in &self.surfaces {
            let e = surface.extent;
            let mut x = e.min_x;
            while x <= e.max_x + 1e-4 {
                let mut z = e.min_z;
                while z <= e.max_z + 1e-4 {
                    points.push(Point3D::new(x, surface.height, z));
                    z += spacing;
                }
                x += spacing;
            }
        }
        points
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::room()
    }
}
