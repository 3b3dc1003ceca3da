//! Stand-ins for the device: tracking, hit-testing and asset downloads

mod loader;
mod platform;
mod world;

pub use loader::{builtin_model, SimLoader};
pub use platform::{SimFrame, SimPlatform};
pub use world::{Extent, SimWorld, Surface, SurfaceHit, EYE_HEIGHT};
