//! Simulated AR platform, session and frames

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use arplace::platform::{
    EndCallback, HitTestResult, HitTestSource, ListenerId, ReferenceSpace, ReferenceSpaceKind,
};
use arplace::{
    ArError, ArFrame, ArPlatform, ArSession, Capability, CapabilitySet, Pose, Transform, Vector3D,
};
use futures::future::{self, BoxFuture};
use futures::FutureExt;

use super::world::{SimWorld, EYE_HEIGHT};

#[derive(Default)]
struct Hub {
    next_session: u64,
    next_listener: u64,
    active: Option<u64>,
    ended: HashSet<u64>,
    listeners: Vec<(u64, ListenerId, EndCallback)>,
}

impl Hub {
    /// Mark `session` ended and fire its listeners once
    fn end(&mut self, session: u64) -> Vec<EndCallback> {
        if !self.ended.insert(session) {
            return Vec::new();
        }
        if self.active == Some(session) {
            self.active = None;
        }
        let (fired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.listeners)
            .into_iter()
            .partition(|(owner, _, _)| *owner == session);
        self.listeners = kept;
        fired.into_iter().map(|(_, _, callback)| callback).collect()
    }
}

fn lock(hub: &Mutex<Hub>) -> MutexGuard<'_, Hub> {
    hub.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A device with configurable AR support. Clones share session state.
#[derive(Clone)]
pub struct SimPlatform {
    hub: Arc<Mutex<Hub>>,
    hit_test: bool,
    available: bool,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self {
            hub: Arc::new(Mutex::new(Hub::default())),
            hit_test: true,
            available: true,
        }
    }

    pub fn with_hit_test(mut self, hit_test: bool) -> Self {
        self.hit_test = hit_test;
        self
    }

    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// The system ends the running session, as a back gesture would.
    ///
    /// Returns false when no session is running.
    pub fn end_active_session(&self) -> bool {
        let callbacks = {
            let mut hub = lock(&self.hub);
            match hub.active {
                Some(session) => hub.end(session),
                None => return false,
            }
        };
        tracing::info!("platform ended the active session");
        for mut callback in callbacks {
            callback();
        }
        true
    }

    pub fn has_active_session(&self) -> bool {
        lock(&self.hub).active.is_some()
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl ArPlatform for SimPlatform {
    fn request_session(
        &mut self,
        capabilities: &CapabilitySet,
    ) -> BoxFuture<'static, Result<Box<dyn ArSession>, ArError>> {
        if !self.available {
            return future::ready(Err(ArError::Unsupported(
                "immersive-ar sessions are not available on this device".to_string(),
            )))
            .boxed();
        }

        let mut hub = lock(&self.hub);
        if let Some(previous) = hub.active {
            hub.end(previous);
        }
        hub.next_session += 1;
        let id = hub.next_session;
        hub.active = Some(id);
        tracing::debug!(session = id, optional = ?capabilities.optional, "granting session");

        let session: Box<dyn ArSession> = Box::new(SimSession {
            id,
            hub: Arc::clone(&self.hub),
            hit_test: self.hit_test,
        });
        future::ready(Ok(session)).boxed()
    }
}

struct SimSession {
    id: u64,
    hub: Arc<Mutex<Hub>>,
    hit_test: bool,
}

impl ArSession for SimSession {
    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::HitTest => self.hit_test,
            Capability::DomOverlay => true,
            Capability::LightEstimation | Capability::Anchors => false,
        }
    }

    fn request_reference_space(
        &mut self,
        kind: ReferenceSpaceKind,
    ) -> Result<ReferenceSpace, ArError> {
        let id = match kind {
            ReferenceSpaceKind::Viewer => 1,
            ReferenceSpaceKind::Local => 2,
            ReferenceSpaceKind::LocalFloor => 3,
        };
        Ok(ReferenceSpace::new(id, kind))
    }

    fn request_hit_test_source(
        &mut self,
        space: &ReferenceSpace,
    ) -> BoxFuture<'static, Option<HitTestSource>> {
        let source = self.hit_test.then(|| HitTestSource::new(self.id, *space));
        future::ready(source).boxed()
    }

    fn on_end(&mut self, callback: EndCallback) -> ListenerId {
        let mut hub = lock(&self.hub);
        hub.next_listener += 1;
        let id = ListenerId(hub.next_listener);
        hub.listeners.push((self.id, id, callback));
        id
    }

    fn remove_end_listener(&mut self, id: ListenerId) {
        lock(&self.hub)
            .listeners
            .retain(|(_, listener, _)| *listener != id);
    }

    fn end(&mut self) {
        let callbacks = lock(&self.hub).end(self.id);
        for mut callback in callbacks {
            callback();
        }
    }
}

/// One tick of tracking data: the head pose within the room
pub struct SimFrame<'a> {
    world: &'a SimWorld,
    head: Transform,
}

impl<'a> SimFrame<'a> {
    pub fn new(world: &'a SimWorld, head: Transform) -> Self {
        Self { world, head }
    }

    fn ray_origin_direction(&self, kind: ReferenceSpaceKind) -> (arplace::Point3D, Vector3D) {
        match kind {
            ReferenceSpaceKind::Viewer => (self.head.position, self.head.forward()),
            ReferenceSpaceKind::Local | ReferenceSpaceKind::LocalFloor => {
                (arplace::Point3D::ORIGIN, Vector3D::FORWARD)
            }
        }
    }

    /// Express a tracking-space pose in `space`
    fn in_space(&self, pose: Pose, kind: ReferenceSpaceKind) -> Pose {
        match kind {
            ReferenceSpaceKind::Local => pose,
            ReferenceSpaceKind::LocalFloor => {
                Pose::from_translation(arplace::Point3D::new(0.0, EYE_HEIGHT, 0.0)) * pose
            }
            ReferenceSpaceKind::Viewer => {
                let t = pose.to_transform();
                Transform::from_position_rotation(
                    self.head.inverse_transform_point(t.position),
                    self.head.rotation.inverse() * t.rotation,
                )
                .to_pose()
            }
        }
    }
}

impl ArFrame for SimFrame<'_> {
    fn viewer_pose(&self, space: &ReferenceSpace) -> Option<Pose> {
        Some(self.in_space(self.head.to_pose(), space.kind()))
    }

    fn hit_test_results(&self, source: &HitTestSource) -> Vec<HitTestResult> {
        let (origin, direction) = self.ray_origin_direction(source.space().kind());
        self.world
            .raycast(origin, direction)
            .into_iter()
            .map(|hit| HitTestResult::new(Pose::from_translation(hit.point)))
            .collect()
    }

    fn result_pose(&self, result: &HitTestResult, space: &ReferenceSpace) -> Option<Pose> {
        Some(self.in_space(*result.native_pose(), space.kind()))
    }
}
