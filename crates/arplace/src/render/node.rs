//! Scene graph node types handed to the render backend

use std::f32::consts::TAU;

use crate::spatial::{Point3D, Pose, Vector3D};
use super::Color;

/// Handle to a scene created by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(pub u64);

/// Handle to a node inserted into a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

/// Handle to a material owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u64);

/// Mesh shapes the pipeline and loaders describe
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Flat annulus lying in the XZ plane, the reticle shape
    Ring { inner_radius: f32, outer_radius: f32 },
    /// Cone standing on its base with the apex at +Y
    Cone { radius: f32, height: f32 },
    /// Axis-aligned box resting on y = 0
    Cuboid { size: Vector3D },
}

impl Geometry {
    /// Sample points in local space, enough to sketch the silhouette
    pub fn outline_points(&self, segments: usize) -> Vec<Point3D> {
        let segments = segments.max(3);
        match *self {
            Geometry::Ring { inner_radius, outer_radius } => {
                let r = (inner_radius + outer_radius) * 0.5;
                circle(r, 0.0, segments)
            }
            Geometry::Cone { radius, height } => {
                let mut points = circle(radius, 0.0, segments);
                let apex = Point3D::new(0.0, height, 0.0);
                let base: Vec<Point3D> = points.clone();
                for p in base {
                    points.push(p.lerp(&apex, 0.5));
                }
                points.push(apex);
                points
            }
            Geometry::Cuboid { size } => {
                let (hx, hz) = (size.x * 0.5, size.z * 0.5);
                let mut points = Vec::with_capacity(8);
                for y in [0.0, size.y] {
                    for (x, z) in [(-hx, -hz), (hx, -hz), (hx, hz), (-hx, hz)] {
                        points.push(Point3D::new(x, y, z));
                    }
                }
                points
            }
        }
    }
}

fn circle(radius: f32, y: f32, segments: usize) -> Vec<Point3D> {
    (0..segments)
        .map(|i| {
            let a = i as f32 / segments as f32 * TAU;
            Point3D::new(radius * a.cos(), y, radius * a.sin())
        })
        .collect()
}

/// A mesh within a node; its material is replaced by the placement policy
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    pub material: Option<MaterialHandle>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            geometry,
            material: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Hemisphere { sky: Color, ground: Color, intensity: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Surface indicator driven by hit-test results
    Reticle,
    /// A loaded model
    Model,
    Light(LightKind),
}

/// A scene graph entry
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub meshes: Vec<Mesh>,
    pub transform: Pose,
    pub visible: bool,
}

impl SceneNode {
    pub fn model(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Model,
            meshes,
            transform: Pose::IDENTITY,
            visible: true,
        }
    }

    /// Hidden ring marker; shown once a surface is tracked
    pub fn reticle() -> Self {
        Self {
            name: "reticle".to_string(),
            kind: NodeKind::Reticle,
            meshes: vec![Mesh::new(
                "ring",
                Geometry::Ring {
                    inner_radius: 0.15,
                    outer_radius: 0.2,
                },
            )],
            transform: Pose::IDENTITY,
            visible: false,
        }
    }

    pub fn hemisphere_light(sky: Color, ground: Color, intensity: f32) -> Self {
        Self {
            name: "hemisphere-light".to_string(),
            kind: NodeKind::Light(LightKind::Hemisphere { sky, ground, intensity }),
            meshes: Vec::new(),
            transform: Pose::from_translation(Point3D::new(0.5, 1.0, 0.25)),
            visible: true,
        }
    }

    /// Replace every mesh material with one shared material
    pub fn apply_material(&mut self, material: MaterialHandle) {
        for mesh in &mut self.meshes {
            mesh.material = Some(material);
        }
    }
}
