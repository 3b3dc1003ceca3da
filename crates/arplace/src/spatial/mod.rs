//! Spatial primitives for AR surface placement
//!
//! Follows the WebXR convention, a right-handed coordinate system:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Backward (+) / Forward (-), the viewer looks down -Z

mod point3d;
mod vector3d;
mod quaternion;
mod transform;
mod pose;

pub use point3d::Point3D;
pub use vector3d::Vector3D;
pub use quaternion::Quaternion;
pub use transform::Transform;
pub use pose::Pose;
