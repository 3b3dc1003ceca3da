//! Render backend trait definition

use crate::error::RenderError;
use crate::spatial::Pose;
use super::{MaterialConfig, MaterialHandle, NodeHandle, SceneId, SceneNode};

/// Backend that owns the display surface and rasterizes a scene graph.
///
/// Called only from the frame thread; implementations need no locking.
pub trait RenderBackend {
    /// Attach the render surface to the screen/document
    fn attach_surface(&mut self) -> Result<(), RenderError>;

    /// Detach the render surface; must tolerate repeated calls
    fn detach_surface(&mut self);

    /// Surface size changed
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn create_scene(&mut self) -> SceneId;

    /// Drop a scene and every node still inside it
    fn dispose_scene(&mut self, scene: SceneId);

    fn add_node(&mut self, scene: SceneId, node: SceneNode) -> Result<NodeHandle, RenderError>;

    /// Remove a node; unknown handles are ignored
    fn remove_node(&mut self, node: NodeHandle);

    fn set_node_transform(&mut self, node: NodeHandle, transform: &Pose) -> Result<(), RenderError>;

    fn set_node_visible(&mut self, node: NodeHandle, visible: bool) -> Result<(), RenderError>;

    fn create_standard_material(&mut self, config: &MaterialConfig) -> MaterialHandle;

    /// Release a material; unknown handles are ignored
    fn dispose_material(&mut self, material: MaterialHandle);

    /// Change an existing material in place (every mesh sharing it follows)
    fn update_material(
        &mut self,
        material: MaterialHandle,
        config: &MaterialConfig,
    ) -> Result<(), RenderError>;

    /// Rasterize `scene` from the viewer's `camera` pose and present it
    fn submit_frame(&mut self, scene: SceneId, camera: &Pose) -> Result<(), RenderError>;
}
