//! In-memory scene graph shared by backends

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::RenderError;
use crate::spatial::Pose;
use super::{MaterialConfig, MaterialHandle, NodeHandle, SceneId, SceneNode};

/// Bookkeeping for scenes, nodes and materials.
///
/// Backends wrap this and add rasterization on top; nodes iterate in
/// insertion order.
#[derive(Debug, Default)]
pub struct SceneGraph {
    scenes: HashSet<SceneId>,
    nodes: BTreeMap<NodeHandle, (SceneId, SceneNode)>,
    materials: HashMap<MaterialHandle, MaterialConfig>,
    next_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn create_scene(&mut self) -> SceneId {
        let id = SceneId(self.next());
        self.scenes.insert(id);
        id
    }

    pub fn dispose_scene(&mut self, scene: SceneId) {
        self.scenes.remove(&scene);
        self.nodes.retain(|_, (owner, _)| *owner != scene);
    }

    pub fn add_node(&mut self, scene: SceneId, node: SceneNode) -> Result<NodeHandle, RenderError> {
        if !self.scenes.contains(&scene) {
            return Err(RenderError::UnknownScene(scene.0));
        }
        let handle = NodeHandle(self.next());
        self.nodes.insert(handle, (scene, node));
        Ok(handle)
    }

    pub fn remove_node(&mut self, node: NodeHandle) -> Option<SceneNode> {
        self.nodes.remove(&node).map(|(_, n)| n)
    }

    pub fn node(&self, node: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(&node).map(|(_, n)| n)
    }

    fn node_mut(&mut self, node: NodeHandle) -> Result<&mut SceneNode, RenderError> {
        self.nodes
            .get_mut(&node)
            .map(|(_, n)| n)
            .ok_or(RenderError::UnknownNode(node.0))
    }

    pub fn set_node_transform(
        &mut self,
        node: NodeHandle,
        transform: &Pose,
    ) -> Result<(), RenderError> {
        self.node_mut(node)?.transform = *transform;
        Ok(())
    }

    pub fn set_node_visible(&mut self, node: NodeHandle, visible: bool) -> Result<(), RenderError> {
        self.node_mut(node)?.visible = visible;
        Ok(())
    }

    pub fn create_material(&mut self, config: &MaterialConfig) -> MaterialHandle {
        let handle = MaterialHandle(self.next());
        self.materials.insert(handle, *config);
        handle
    }

    pub fn update_material(
        &mut self,
        material: MaterialHandle,
        config: &MaterialConfig,
    ) -> Result<(), RenderError> {
        let slot = self
            .materials
            .get_mut(&material)
            .ok_or(RenderError::UnknownMaterial(material.0))?;
        *slot = *config;
        Ok(())
    }

    pub fn remove_material(&mut self, material: MaterialHandle) -> Option<MaterialConfig> {
        self.materials.remove(&material)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn material(&self, material: MaterialHandle) -> Option<&MaterialConfig> {
        self.materials.get(&material)
    }

    pub fn has_scene(&self, scene: SceneId) -> bool {
        self.scenes.contains(&scene)
    }

    /// Nodes of one scene in insertion order
    pub fn nodes_in(&self, scene: SceneId) -> impl Iterator<Item = (NodeHandle, &SceneNode)> {
        self.nodes
            .iter()
            .filter(move |(_, (owner, _))| *owner == scene)
            .map(|(handle, (_, node))| (*handle, node))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
