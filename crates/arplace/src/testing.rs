//! In-memory collaborators for unit tests

use std::sync::{Arc, Mutex, MutexGuard};

use futures::channel::oneshot;
use futures::future::{self, BoxFuture};
use futures::FutureExt;

use crate::error::{ArError, LoadError, RenderError};
use crate::placement::ModelLoader;
use crate::platform::{
    ArFrame, ArPlatform, ArSession, Capability, CapabilitySet, EndCallback, HitTestResult,
    HitTestSource, ListenerId, ReferenceSpace, ReferenceSpaceKind,
};
use crate::render::{
    Geometry, MaterialConfig, MaterialHandle, Mesh, NodeHandle, RenderBackend, SceneGraph, SceneId,
    SceneNode,
};
use crate::spatial::{Pose, Vector3D};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Observable side effects of a [`MockSession`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    pub source_requests: usize,
    pub end_calls: usize,
    pub listeners_added: usize,
    pub listeners_removed: usize,
    pub active_listeners: usize,
}

#[derive(Default)]
struct SessionShared {
    record: SessionRecord,
    hit_test: bool,
    listeners: Vec<(ListenerId, EndCallback)>,
    next_listener: u64,
    defer_source: bool,
    pending_sources: Vec<oneshot::Sender<Option<HitTestSource>>>,
}

/// Session handle; clones share state so tests can inspect a session the
/// lifecycle owns.
#[derive(Clone)]
pub struct MockSession {
    shared: Arc<Mutex<SessionShared>>,
}

impl MockSession {
    pub fn new(hit_test: bool) -> Self {
        Self {
            shared: Arc::new(Mutex::new(SessionShared {
                hit_test,
                ..Default::default()
            })),
        }
    }

    /// Session whose hit-test source waits for [`MockSession::resolve_source`]
    pub fn deferring_source(hit_test: bool) -> Self {
        let session = Self::new(hit_test);
        lock(&session.shared).defer_source = true;
        session
    }

    /// Resolve every pending hit-test source request
    pub fn resolve_source(&self) {
        let pending = std::mem::take(&mut lock(&self.shared).pending_sources);
        let space = ReferenceSpace::new(1, ReferenceSpaceKind::Viewer);
        for tx in pending {
            let _ = tx.send(Some(HitTestSource::new(7, space)));
        }
    }

    pub fn record(&self) -> SessionRecord {
        let shared = lock(&self.shared);
        let mut record = shared.record.clone();
        record.active_listeners = shared.listeners.len();
        record
    }

    /// The platform ends the session on its own (e.g. a system back gesture)
    pub fn platform_end(&self) {
        let listeners = std::mem::take(&mut lock(&self.shared).listeners);
        for (_, mut callback) in listeners {
            callback();
        }
    }
}

impl ArSession for MockSession {
    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::HitTest => lock(&self.shared).hit_test,
            _ => false,
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
        let mut shared = lock(&self.shared);
        shared.record.source_requests += 1;
        if shared.defer_source {
            let (tx, rx) = oneshot::channel();
            shared.pending_sources.push(tx);
            return rx.map(|reply| reply.unwrap_or(None)).boxed();
        }
        future::ready(Some(HitTestSource::new(7, *space))).boxed()
    }

    fn on_end(&mut self, callback: EndCallback) -> ListenerId {
        let mut shared = lock(&self.shared);
        shared.next_listener += 1;
        let id = ListenerId(shared.next_listener);
        shared.listeners.push((id, callback));
        shared.record.listeners_added += 1;
        id
    }

    fn remove_end_listener(&mut self, id: ListenerId) {
        let mut shared = lock(&self.shared);
        shared.listeners.retain(|(listener, _)| *listener != id);
        shared.record.listeners_removed += 1;
    }

    fn end(&mut self) {
        lock(&self.shared).record.end_calls += 1;
        self.platform_end();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PlatformMode {
    Grant,
    Refuse,
    Defer,
}

type SessionReply = Result<Box<dyn ArSession>, ArError>;

struct PlatformShared {
    mode: PlatformMode,
    hit_test: bool,
    defer_sources: bool,
    sessions: Vec<MockSession>,
    deferred: Vec<oneshot::Sender<SessionReply>>,
}

impl PlatformShared {
    fn new_session(&self) -> MockSession {
        if self.defer_sources {
            MockSession::deferring_source(self.hit_test)
        } else {
            MockSession::new(self.hit_test)
        }
    }
}

/// Platform handle; clones share the sessions it granted
#[derive(Clone)]
pub struct MockPlatform {
    shared: Arc<Mutex<PlatformShared>>,
}

impl MockPlatform {
    fn with(mode: PlatformMode, hit_test: bool) -> Self {
        Self {
            shared: Arc::new(Mutex::new(PlatformShared {
                mode,
                hit_test,
                defer_sources: false,
                sessions: Vec::new(),
                deferred: Vec::new(),
            })),
        }
    }

    /// Grants sessions with hit-testing immediately
    pub fn new() -> Self {
        Self::with(PlatformMode::Grant, true)
    }

    pub fn without_hit_test() -> Self {
        Self::with(PlatformMode::Grant, false)
    }

    pub fn refusing() -> Self {
        Self::with(PlatformMode::Refuse, true)
    }

    /// Holds session requests until [`MockPlatform::grant_deferred`]
    pub fn deferred() -> Self {
        Self::with(PlatformMode::Defer, true)
    }

    /// Grants sessions whose hit-test sources resolve only on request
    pub fn deferring_sources() -> Self {
        let platform = Self::new();
        lock(&platform.shared).defer_sources = true;
        platform
    }

    pub fn grant_deferred(&self) {
        let mut shared = lock(&self.shared);
        let pending = std::mem::take(&mut shared.deferred);
        for tx in pending {
            let session = shared.new_session();
            shared.sessions.push(session.clone());
            let _ = tx.send(Ok(Box::new(session)));
        }
    }

    pub fn sessions(&self) -> Vec<MockSession> {
        lock(&self.shared).sessions.clone()
    }
}

impl ArPlatform for MockPlatform {
    fn request_session(
        &mut self,
        _capabilities: &CapabilitySet,
    ) -> BoxFuture<'static, SessionReply> {
        let mut shared = lock(&self.shared);
        match shared.mode {
            PlatformMode::Grant => {
                let session = shared.new_session();
                shared.sessions.push(session.clone());
                let reply: SessionReply = Ok(Box::new(session));
                future::ready(reply).boxed()
            }
            PlatformMode::Refuse => {
                future::ready(Err(ArError::Unsupported("immersive-ar".to_string()))).boxed()
            }
            PlatformMode::Defer => {
                let (tx, rx) = oneshot::channel();
                shared.deferred.push(tx);
                rx.map(|reply| {
                    let dropped = ArError::Unsupported("request dropped".to_string());
                    reply.unwrap_or(Err(dropped))
                })
                .boxed()
            }
        }
    }
}

/// Frame with scripted hit-test results
#[derive(Debug, Clone, Default)]
pub struct MockFrame {
    hits: Vec<Pose>,
    space_offset: Option<Pose>,
    viewer: Option<Pose>,
}

impl MockFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Results in ranking order, poses in the native frame
    pub fn with_hits(hits: Vec<Pose>) -> Self {
        Self {
            hits,
            ..Default::default()
        }
    }

    /// Transform applied when expressing a result in a reference space
    pub fn with_space_offset(mut self, offset: Pose) -> Self {
        self.space_offset = Some(offset);
        self
    }

    pub fn with_viewer(mut self, viewer: Pose) -> Self {
        self.viewer = Some(viewer);
        self
    }
}

impl ArFrame for MockFrame {
    fn viewer_pose(&self, _space: &ReferenceSpace) -> Option<Pose> {
        Some(self.viewer.unwrap_or(Pose::IDENTITY))
    }

    fn hit_test_results(&self, _source: &HitTestSource) -> Vec<HitTestResult> {
        self.hits.iter().copied().map(HitTestResult::new).collect()
    }

    fn result_pose(&self, result: &HitTestResult, _space: &ReferenceSpace) -> Option<Pose> {
        let native = *result.native_pose();
        Some(match self.space_offset {
            Some(offset) => offset * native,
            None => native,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LoaderMode {
    Ready,
    Pending,
    Failing,
}

type LoadReply = Result<SceneNode, LoadError>;

struct LoaderShared {
    mode: LoaderMode,
    requests: usize,
    last_url: Option<String>,
    pending: Vec<oneshot::Sender<LoadReply>>,
}

/// Loader handle; clones share request counts and pending loads
#[derive(Clone)]
pub struct MockLoader {
    shared: Arc<Mutex<LoaderShared>>,
}

impl MockLoader {
    fn with(mode: LoaderMode) -> Self {
        Self {
            shared: Arc::new(Mutex::new(LoaderShared {
                mode,
                requests: 0,
                last_url: None,
                pending: Vec::new(),
            })),
        }
    }

    /// Loads resolve on first poll
    pub fn ready() -> Self {
        Self::with(LoaderMode::Ready)
    }

    /// Loads wait for [`MockLoader::resolve_all`]
    pub fn pending() -> Self {
        Self::with(LoaderMode::Pending)
    }

    pub fn failing() -> Self {
        Self::with(LoaderMode::Failing)
    }

    pub fn requests(&self) -> usize {
        lock(&self.shared).requests
    }

    pub fn last_url(&self) -> Option<String> {
        lock(&self.shared).last_url.clone()
    }

    pub fn resolve_all(&self) {
        let pending = std::mem::take(&mut lock(&self.shared).pending);
        for tx in pending {
            let _ = tx.send(Ok(sample_model()));
        }
    }
}

impl ModelLoader for MockLoader {
    fn load(&self, url: &str) -> BoxFuture<'static, LoadReply> {
        let mut shared = lock(&self.shared);
        shared.requests += 1;
        shared.last_url = Some(url.to_string());
        match shared.mode {
            LoaderMode::Ready => future::ready(Ok(sample_model())).boxed(),
            LoaderMode::Failing => future::ready(Err(LoadError::NotFound(url.to_string()))).boxed(),
            LoaderMode::Pending => {
                let (tx, rx) = oneshot::channel();
                shared.pending.push(tx);
                let url = url.to_string();
                rx.map(move |reply| reply.unwrap_or_else(|_| Err(LoadError::Cancelled(url))))
                    .boxed()
            }
        }
    }
}

/// Two-mesh model so material tests see more than one mesh
pub fn sample_model() -> SceneNode {
    SceneNode::model(
        "cone",
        vec![
            Mesh::new("tip", Geometry::Cone { radius: 0.05, height: 0.2 }),
            Mesh::new("base", Geometry::Cuboid { size: Vector3D::new(0.1, 0.01, 0.1) }),
        ],
    )
}

/// Backend that keeps the scene graph and records surface calls
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub graph: SceneGraph,
    pub attached: bool,
    pub attach_calls: usize,
    pub detach_calls: usize,
    pub frames: Vec<(SceneId, Pose)>,
    pub resizes: Vec<(u32, u32)>,
    scenes: Vec<SceneId>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently created scene
    pub fn last_scene(&self) -> Option<SceneId> {
        self.scenes.last().copied()
    }
}

impl RenderBackend for RecordingBackend {
    fn attach_surface(&mut self) -> Result<(), RenderError> {
        self.attach_calls += 1;
        self.attached = true;
        Ok(())
    }

    fn detach_surface(&mut self) {
        self.detach_calls += 1;
        self.attached = false;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }

    fn create_scene(&mut self) -> SceneId {
        let scene = self.graph.create_scene();
        self.scenes.push(scene);
        scene
    }

    fn dispose_scene(&mut self, scene: SceneId) {
        self.graph.dispose_scene(scene);
    }

    fn add_node(&mut self, scene: SceneId, node: SceneNode) -> Result<NodeHandle, RenderError> {
        self.graph.add_node(scene, node)
    }

    fn remove_node(&mut self, node: NodeHandle) {
        self.graph.remove_node(node);
    }

    fn set_node_transform(
        &mut self,
        node: NodeHandle,
        transform: &Pose,
    ) -> Result<(), RenderError> {
        self.graph.set_node_transform(node, transform)
    }

    fn set_node_visible(&mut self, node: NodeHandle, visible: bool) -> Result<(), RenderError> {
        self.graph.set_node_visible(node, visible)
    }

    fn create_standard_material(&mut self, config: &MaterialConfig) -> MaterialHandle {
        self.graph.create_material(config)
    }

    fn dispose_material(&mut self, material: MaterialHandle) {
        self.graph.remove_material(material);
    }

    fn update_material(
        &mut self,
        material: MaterialHandle,
        config: &MaterialConfig,
    ) -> Result<(), RenderError> {
        self.graph.update_material(material, config)
    }

    fn submit_frame(&mut self, scene: SceneId, camera: &Pose) -> Result<(), RenderError> {
        if !self.graph.has_scene(scene) {
            return Err(RenderError::UnknownScene(scene.0));
        }
        self.frames.push((scene, *camera));
        Ok(())
    }
}
