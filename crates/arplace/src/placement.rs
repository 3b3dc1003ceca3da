//! Single-model placement at the reticle pose

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::config::{ArPlaceConfig, ModelEntry};
use crate::error::{ArError, LoadError, Result};
use crate::render::{MaterialConfig, MaterialHandle, NodeHandle, RenderBackend, SceneId, SceneNode};
use crate::reticle::Reticle;
use crate::spatial::Pose;

/// Asynchronous 3D asset loader
pub trait ModelLoader {
    fn load(&self, url: &str) -> BoxFuture<'static, std::result::Result<SceneNode, LoadError>>;
}

/// Model choice and material policy, as set from the UI
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementSettings {
    catalog: Vec<ModelEntry>,
    selected: usize,
    material: MaterialConfig,
}

impl PlacementSettings {
    /// An empty catalog falls back to the built-in cone
    pub fn new(catalog: Vec<ModelEntry>, material: MaterialConfig) -> Self {
        let catalog = if catalog.is_empty() {
            ArPlaceConfig::default().model_catalog()
        } else {
            catalog
        };
        Self {
            catalog,
            selected: 0,
            material,
        }
    }

    pub fn from_config(config: &ArPlaceConfig) -> Self {
        Self::new(config.model_catalog(), config.material)
    }

    pub fn catalog(&self) -> &[ModelEntry] {
        &self.catalog
    }

    pub fn selected(&self) -> &ModelEntry {
        &self.catalog[self.selected]
    }

    /// Pick the model used by the next load; false for unknown names
    pub fn select_model(&mut self, name: &str) -> bool {
        match self.catalog.iter().position(|m| m.name == name) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    pub fn wireframe(&self) -> bool {
        self.material.wireframe
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.material.wireframe = wireframe;
    }

    /// The standard material placed models receive
    pub fn material(&self) -> &MaterialConfig {
        &self.material
    }
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self::from_config(&ArPlaceConfig::default())
    }
}

/// A finished model load together with the reticle pose captured at select time
#[derive(Debug)]
pub struct LoadCompletion {
    pub url: String,
    pub snapshot: Pose,
    pub result: std::result::Result<SceneNode, LoadError>,
}

pub type LoadRequest = BoxFuture<'static, LoadCompletion>;

/// The model currently in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedModel {
    url: String,
    transform: Pose,
    node: NodeHandle,
    material: MaterialHandle,
}

impl PlacedModel {
    /// A placed model always has its asset resolved
    pub fn loaded(&self) -> bool {
        true
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn transform(&self) -> &Pose {
        &self.transform
    }

    pub fn node(&self) -> NodeHandle {
        self.node
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }
}

#[derive(Debug)]
enum Slot {
    Empty,
    Loading { url: String },
    Placed(PlacedModel),
}

/// What a select did
pub enum SelectOutcome {
    /// Reticle hidden or a load already pending
    Ignored,
    /// First placement; the caller drives the load to completion
    LoadStarted(LoadRequest),
    /// The placed model moved to the reticle
    Moved(Pose),
}

/// Owns the zero-or-one placed model of a session
#[derive(Debug)]
pub struct PlacementController {
    slot: Slot,
}

impl PlacementController {
    pub fn new() -> Self {
        Self { slot: Slot::Empty }
    }

    /// React to a select signal.
    ///
    /// The reticle transform is captured now; a load that resolves later still
    /// places the model where the reticle was when the user selected.
    pub fn handle_select(
        &mut self,
        reticle: &Reticle,
        settings: &PlacementSettings,
        loader: &dyn ModelLoader,
        backend: &mut dyn RenderBackend,
    ) -> SelectOutcome {
        let Some(snapshot) = reticle.pose() else {
            tracing::debug!("select ignored: no surface tracked");
            return SelectOutcome::Ignored;
        };

        match &mut self.slot {
            Slot::Loading { url } => {
                tracing::debug!(url = %url, "select ignored: load in flight");
                return SelectOutcome::Ignored;
            }
            Slot::Placed(model) => {
                model.transform = snapshot;
                if let Err(e) = backend.set_node_transform(model.node, &snapshot) {
                    tracing::warn!(error = %e, "failed to move placed model");
                }
                return SelectOutcome::Moved(snapshot);
            }
            Slot::Empty => {}
        }

        let url = settings.selected().url.clone();
        tracing::info!(url = %url, "loading model");
        self.slot = Slot::Loading { url: url.clone() };
        let request = loader
            .load(&url)
            .map(move |result| LoadCompletion { url, snapshot, result })
            .boxed();
        SelectOutcome::LoadStarted(request)
    }

    /// Apply a finished load.
    ///
    /// On success every mesh receives one shared standard material and the
    /// node enters `scene` at the captured pose. On failure the slot empties so
    /// the next select retries.
    pub fn complete_load(
        &mut self,
        completion: LoadCompletion,
        settings: &PlacementSettings,
        backend: &mut dyn RenderBackend,
        scene: SceneId,
    ) -> Result<&PlacedModel> {
        if !matches!(self.slot, Slot::Loading { .. }) {
            return Err(ArError::InvariantViolation(format!(
                "load of {} completed with no load pending",
                completion.url
            )));
        }

        let mut node = match completion.result {
            Ok(node) => node,
            Err(e) => {
                self.slot = Slot::Empty;
                return Err(e.into());
            }
        };

        let material = backend.create_standard_material(settings.material());
        node.apply_material(material);
        node.transform = completion.snapshot;

        let handle = match backend.add_node(scene, node) {
            Ok(handle) => handle,
            Err(e) => {
                backend.dispose_material(material);
                self.slot = Slot::Empty;
                return Err(e.into());
            }
        };

        tracing::info!(url = %completion.url, "model placed");
        self.slot = Slot::Placed(PlacedModel {
            url: completion.url,
            transform: completion.snapshot,
            node: handle,
            material,
        });
        match &self.slot {
            Slot::Placed(model) => Ok(model),
            _ => Err(ArError::InvariantViolation("placement slot lost".to_string())),
        }
    }

    /// Push the current material policy onto the placed model, if any
    pub fn refresh_material(&self, settings: &PlacementSettings, backend: &mut dyn RenderBackend) {
        if let Slot::Placed(model) = &self.slot {
            if let Err(e) = backend.update_material(model.material, settings.material()) {
                tracing::warn!(error = %e, "failed to update placed model material");
            }
        }
    }

    pub fn placed(&self) -> Option<&PlacedModel> {
        match &self.slot {
            Slot::Placed(model) => Some(model),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.slot, Slot::Loading { .. })
    }

    /// Remove the placed model and its material, and empty the slot
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        if let Slot::Placed(model) = std::mem::replace(&mut self.slot, Slot::Empty) {
            backend.remove_node(model.node);
            backend.dispose_material(model.material);
        }
    }
}

impl Default for PlacementController {
    fn default() -> Self {
        Self::new()
    }
}
