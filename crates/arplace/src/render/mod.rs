//! Rendering backend abstraction
//!
//! The pipeline never rasterizes; it describes a scene graph through
//! [`RenderBackend`] and submits one frame per display tick:
//! - [`SceneGraph`] is an in-memory graph backends can build on
//! - [`MaterialConfig`] is the standardized material applied to placed models

mod backend;
mod material;
mod node;
mod scene;

pub use backend::RenderBackend;
pub use material::{Color, MaterialConfig};
pub use node::{Geometry, LightKind, MaterialHandle, Mesh, NodeHandle, NodeKind, SceneId, SceneNode};
pub use scene::SceneGraph;
