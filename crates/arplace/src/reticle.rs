//! Surface tracking indicator

use crate::error::RenderError;
use crate::render::{NodeHandle, RenderBackend, SceneId, SceneNode};
use crate::spatial::Pose;

/// Snapshot of the reticle state.
///
/// The transform is only meaningful while visible, so it is exposed through
/// [`Reticle::pose`], which is gated on visibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reticle {
    visible: bool,
    transform: Pose,
}

impl Reticle {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            transform: Pose::IDENTITY,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The tracked surface pose, if a surface is currently tracked
    pub fn pose(&self) -> Option<Pose> {
        self.visible.then_some(self.transform)
    }

    /// Last tracked transform, stale while hidden
    pub fn last_transform(&self) -> &Pose {
        &self.transform
    }
}

impl Default for Reticle {
    fn default() -> Self {
        Self::hidden()
    }
}

/// Per-frame reticle driven by hit-test results, mirrored onto a ring node
#[derive(Debug, Default)]
pub struct PoseReticle {
    state: Reticle,
    node: Option<NodeHandle>,
}

impl PoseReticle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply this frame's hit-test outcome.
    ///
    /// `None` hides the reticle and leaves the previous transform in place.
    pub fn update(&mut self, latest: Option<Pose>) {
        match latest {
            Some(pose) => {
                self.state.visible = true;
                self.state.transform = pose;
            }
            None => self.state.visible = false,
        }
    }

    pub fn state(&self) -> Reticle {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    pub fn current_pose(&self) -> Option<Pose> {
        self.state.pose()
    }

    pub fn node(&self) -> Option<NodeHandle> {
        self.node
    }

    /// Insert the ring marker into `scene`
    pub fn attach(
        &mut self,
        backend: &mut dyn RenderBackend,
        scene: SceneId,
    ) -> Result<(), RenderError> {
        if self.node.is_none() {
            self.node = Some(backend.add_node(scene, SceneNode::reticle())?);
        }
        Ok(())
    }

    /// Push visibility and transform to the ring marker
    pub fn sync(&self, backend: &mut dyn RenderBackend) {
        let Some(node) = self.node else {
            return;
        };
        let result = backend
            .set_node_visible(node, self.state.visible)
            .and_then(|_| match self.state.pose() {
                Some(pose) => backend.set_node_transform(node, &pose),
                None => Ok(()),
            });
        if let Err(e) = result {
            tracing::debug!(error = %e, "reticle sync failed");
        }
    }

    /// Remove the ring marker and forget the tracked pose
    pub fn detach(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(node) = self.node.take() {
            backend.remove_node(node);
        }
        self.state = Reticle::hidden();
    }
}
