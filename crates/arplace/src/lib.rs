//! arplace: AR surface tracking and single-model placement
//!
//! This crate provides the placement pipeline for handheld AR devices:
//! - Spatial math and column-major poses as exchanged with AR platforms
//! - Platform traits for sessions, reference spaces and hit-test sources
//! - A hit-test driven reticle and gated placement of one model
//! - Session lifecycle with generation-tagged asynchronous work
//! - A render backend abstraction over a minimal scene graph

pub mod config;
pub mod error;
pub mod frame_loop;
pub mod lifecycle;
pub mod notice;
pub mod pending;
pub mod placement;
pub mod platform;
pub mod render;
pub mod reticle;
pub mod spatial;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{ArPlaceConfig, CameraConfig, ModelEntry, SessionConfig};
pub use error::{ArError, ConfigError, LoadError, RenderError, Result};
pub use frame_loop::{FrameLoop, FrameStats};
pub use hit_test::HitTestChannel;
pub use lifecycle::{SessionLifecycle, SessionState};
pub use notice::{Notice, NoticeKind, Notices};
pub use pending::Generation;
pub use placement::{ModelLoader, PlacedModel, PlacementController, PlacementSettings};
pub use platform::{ArFrame, ArPlatform, ArSession, Capability, CapabilitySet};
pub use render::{MaterialConfig, RenderBackend, SceneGraph, SceneNode};
pub use reticle::{PoseReticle, Reticle};
pub use spatial::{Point3D, Pose, Quaternion, Transform, Vector3D};
