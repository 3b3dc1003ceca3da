//! AR session lifecycle and the per-frame pipeline step
//!
//! [`SessionLifecycle`] is the only owner of session-scoped resources. Every
//! session instance gets a fresh [`Generation`]; asynchronous completions
//! carry the generation that issued them and are discarded when it no longer
//! matches, so a load or session request that outlives its session can never
//! touch the next one.

use futures::FutureExt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::SessionConfig;
use crate::error::ArError;
use crate::hit_test::HitTestChannel;
use crate::notice::{Notice, NoticeKind, Notices};
use crate::pending::{Generation, InFlightQueue};
use crate::placement::{
    LoadCompletion, ModelLoader, PlacedModel, PlacementController, PlacementSettings, SelectOutcome,
};
use crate::platform::{
    ArFrame, ArPlatform, ArSession, HitTestSource, ListenerId, ReferenceSpace, ReferenceSpaceKind,
};
use crate::render::{Color, NodeHandle, RenderBackend, SceneId, SceneNode};
use crate::reticle::{PoseReticle, Reticle};
use crate::spatial::Pose;

/// Hemisphere light intensity added to every session scene
pub const LIGHT_INTENSITY: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Session or hit-test source requested, not yet confirmed
    Starting,
    Active,
    Ending,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Starting => "starting",
            SessionState::Active => "active",
            SessionState::Ending => "ending",
        }
    }
}

enum Completion {
    Session(Result<Box<dyn ArSession>, ArError>),
    HitTestSource(Option<HitTestSource>),
    Model(LoadCompletion),
}

impl Completion {
    fn label(&self) -> &'static str {
        match self {
            Completion::Session(_) => "session",
            Completion::HitTestSource(_) => "hit-test source",
            Completion::Model(_) => "model load",
        }
    }
}

/// Everything one session instance owns
struct SessionContext {
    generation: Generation,
    session: Option<Box<dyn ArSession>>,
    tracking_space: Option<ReferenceSpace>,
    scene: SceneId,
    light: Option<NodeHandle>,
    channel: HitTestChannel,
    reticle: PoseReticle,
    placement: PlacementController,
    end_listener: Option<ListenerId>,
    platform_ended: bool,
    camera: Pose,
}

/// Starts, drives and tears down AR sessions
pub struct SessionLifecycle {
    platform: Box<dyn ArPlatform>,
    loader: Box<dyn ModelLoader>,
    config: SessionConfig,
    settings: PlacementSettings,
    state: SessionState,
    generation: Generation,
    context: Option<SessionContext>,
    in_flight: InFlightQueue<Completion>,
    end_tx: UnboundedSender<Generation>,
    end_rx: UnboundedReceiver<Generation>,
    pending_selects: usize,
    notices: Notices,
}

impl SessionLifecycle {
    pub fn new(
        platform: Box<dyn ArPlatform>,
        loader: Box<dyn ModelLoader>,
        config: SessionConfig,
        settings: PlacementSettings,
    ) -> Self {
        let (end_tx, end_rx) = mpsc::unbounded_channel();
        Self {
            platform,
            loader,
            config,
            settings,
            state: SessionState::Idle,
            generation: Generation::default(),
            context: None,
            in_flight: InFlightQueue::new(),
            end_tx,
            end_rx,
            pending_selects: 0,
            notices: Notices::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Generation of the current (or most recent) session
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Start a new session: attach the surface, build the scene and request
    /// a session with the configured capabilities.
    pub fn start(&mut self, backend: &mut dyn RenderBackend) {
        if self.state != SessionState::Idle {
            absorb(ArError::InvariantViolation(format!(
                "start while {}",
                self.state.name()
            )));
            return;
        }

        if let Err(e) = backend.attach_surface() {
            tracing::warn!(error = %e, "failed to attach render surface");
            self.notices.report(&ArError::from(e));
            return;
        }

        self.generation = self.generation.next();
        let generation = self.generation;
        let scene = backend.create_scene();
        let light_node = SceneNode::hemisphere_light(Color::SKY, Color::GROUND, LIGHT_INTENSITY);
        let light = backend
            .add_node(scene, light_node)
            .map_err(|e| tracing::warn!(error = %e, "failed to add scene light"))
            .ok();

        self.context = Some(SessionContext {
            generation,
            session: None,
            tracking_space: None,
            scene,
            light,
            channel: HitTestChannel::new(),
            reticle: PoseReticle::new(),
            placement: PlacementController::new(),
            end_listener: None,
            platform_ended: false,
            camera: Pose::IDENTITY,
        });
        self.state = SessionState::Starting;

        let capabilities = self.config.capabilities();
        tracing::info!(%generation, required = ?capabilities.required, "requesting AR session");
        let request = self.platform.request_session(&capabilities);
        self.in_flight.push(generation, request.map(Completion::Session).boxed());

        self.pump(backend);
    }

    /// Queue a select for the next frame
    pub fn select(&mut self) {
        if self.state == SessionState::Active {
            self.pending_selects += 1;
        } else {
            tracing::debug!(state = self.state.name(), "select outside active session");
        }
    }

    /// Selects waiting for the next frame
    pub fn queued_selects(&self) -> usize {
        self.pending_selects
    }

    /// Apply platform end signals and finished asynchronous work. Never blocks.
    pub fn pump(&mut self, backend: &mut dyn RenderBackend) {
        while let Ok(ended) = self.end_rx.try_recv() {
            if self.is_current(ended) {
                tracing::info!(generation = %ended, "platform ended session");
                if let Some(ctx) = self.context.as_mut() {
                    ctx.platform_ended = true;
                }
                self.teardown(backend);
            } else {
                tracing::debug!(generation = %ended, "ignoring end of stale session");
            }
        }

        // Applying a completion may issue follow-up work that is already done
        loop {
            let ready = self.in_flight.poll_ready();
            if ready.is_empty() {
                break;
            }
            for (generation, completion) in ready {
                if self.is_current(generation) {
                    self.apply(completion, backend);
                } else {
                    tracing::debug!(
                        %generation,
                        current = %self.generation,
                        kind = completion.label(),
                        "discarding stale completion"
                    );
                    if let Completion::Session(Ok(mut session)) = completion {
                        session.end();
                    }
                }
            }
        }
    }

    /// One display refresh: poll, update the reticle, handle queued selects and
    /// submit the frame. Returns whether a frame was submitted.
    pub fn on_frame(&mut self, frame: &dyn ArFrame, backend: &mut dyn RenderBackend) -> bool {
        self.pump(backend);

        if self.state != SessionState::Active {
            if self.pending_selects > 0 {
                tracing::debug!(
                    dropped = self.pending_selects,
                    "dropping selects outside active session"
                );
                self.pending_selects = 0;
            }
            absorb(ArError::InvariantViolation(format!(
                "frame while {}",
                self.state.name()
            )));
            return false;
        }
        let Some(ctx) = self.context.as_mut() else {
            absorb(ArError::InvariantViolation("active without context".to_string()));
            return false;
        };

        if !ctx.channel.is_unsupported() {
            ctx.reticle.update(ctx.channel.poll(frame));
        }

        let selects = std::mem::take(&mut self.pending_selects);
        let loader = self.loader.as_ref();
        for _ in 0..selects {
            let reticle = ctx.reticle.state();
            let placement = &mut ctx.placement;
            let outcome = placement.handle_select(&reticle, &self.settings, loader, backend);
            if let SelectOutcome::LoadStarted(request) = outcome {
                let load = request.map(Completion::Model).boxed();
                self.in_flight.push(ctx.generation, load);
            }
        }

        ctx.reticle.sync(backend);

        if let Some(pose) = ctx.tracking_space.and_then(|space| frame.viewer_pose(&space)) {
            ctx.camera = pose;
        }
        if let Err(e) = backend.submit_frame(ctx.scene, &ctx.camera) {
            tracing::warn!(error = %e, "frame submission failed");
        }
        true
    }

    /// User-initiated session end
    pub fn exit(&mut self, backend: &mut dyn RenderBackend) {
        if self.context.is_none() {
            tracing::debug!("exit without a session");
            return;
        }
        tracing::info!(generation = %self.generation, "exiting AR session");
        self.teardown(backend);
    }

    /// End any session and return to a clean idle state
    pub fn reset(&mut self, backend: &mut dyn RenderBackend) {
        self.teardown(backend);
        self.notices.drain();
        tracing::info!("reset");
    }

    /// Forward a surface size change while a session owns the surface
    pub fn resize(&mut self, width: u32, height: u32, backend: &mut dyn RenderBackend) {
        if self.context.is_some() {
            backend.resize(width, height);
        } else {
            tracing::debug!(width, height, "resize without a session");
        }
    }

    /// Toggle wireframe rendering; a placed model updates in place
    pub fn set_wireframe(&mut self, wireframe: bool, backend: &mut dyn RenderBackend) {
        self.settings.set_wireframe(wireframe);
        if let Some(ctx) = &self.context {
            ctx.placement.refresh_material(&self.settings, backend);
        }
    }

    /// Choose the model the next placement loads
    pub fn select_model(&mut self, name: &str) -> bool {
        let found = self.settings.select_model(name);
        if !found {
            self.notices
                .push(Notice::info(format!("Unknown model: {}", name)));
        }
        found
    }

    pub fn settings(&self) -> &PlacementSettings {
        &self.settings
    }

    pub fn reticle(&self) -> Option<Reticle> {
        self.context.as_ref().map(|ctx| ctx.reticle.state())
    }

    pub fn placed(&self) -> Option<&PlacedModel> {
        self.context.as_ref().and_then(|ctx| ctx.placement.placed())
    }

    pub fn is_loading(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|ctx| ctx.placement.is_loading())
    }

    /// Whether the current session can hit-test
    pub fn hit_test_available(&self) -> bool {
        self.context.as_ref().is_some_and(|ctx| ctx.channel.is_bound())
    }

    /// Asynchronous operations not yet completed, stale ones included
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
            && self
                .context
                .as_ref()
                .is_some_and(|ctx| ctx.generation == generation)
    }

    fn apply(&mut self, completion: Completion, backend: &mut dyn RenderBackend) {
        match completion {
            Completion::Session(Ok(session)) => self.on_session_granted(session, backend),
            Completion::Session(Err(e)) => {
                tracing::warn!(error = %e, "AR session request failed");
                self.notices.report(&e);
                self.teardown(backend);
            }
            Completion::HitTestSource(source) => {
                let Some(ctx) = self.context.as_mut() else {
                    return;
                };
                ctx.channel.bind(source);
                if ctx.channel.is_unsupported() {
                    self.notices.push(Notice {
                        kind: NoticeKind::Unsupported,
                        message: "Surface detection unavailable".to_string(),
                    });
                }
                self.activate();
            }
            Completion::Model(completion) => {
                let Some(ctx) = self.context.as_mut() else {
                    return;
                };
                let (placement, scene) = (&mut ctx.placement, ctx.scene);
                let result = placement.complete_load(completion, &self.settings, backend, scene);
                if let Err(e) = result {
                    if e.is_user_visible() {
                        tracing::warn!(error = %e, "placement failed");
                        self.notices.report(&e);
                    } else {
                        absorb(e);
                    }
                }
            }
        }
    }

    fn on_session_granted(
        &mut self,
        mut session: Box<dyn ArSession>,
        backend: &mut dyn RenderBackend,
    ) {
        if self.state != SessionState::Starting {
            absorb(ArError::InvariantViolation(format!(
                "session granted while {}",
                self.state.name()
            )));
            session.end();
            return;
        }
        let Some(ctx) = self.context.as_mut() else {
            session.end();
            return;
        };

        let tx = self.end_tx.clone();
        let generation = ctx.generation;
        ctx.end_listener = Some(session.on_end(Box::new(move || {
            let _ = tx.send(generation);
        })));

        let tracking = match session.request_reference_space(ReferenceSpaceKind::Local) {
            Ok(space) => space,
            Err(e) => {
                tracing::warn!(error = %e, "no tracking space");
                ctx.session = Some(session);
                self.notices.report(&e);
                self.teardown(backend);
                return;
            }
        };
        ctx.tracking_space = Some(tracking);

        if let Err(e) = ctx.reticle.attach(backend, ctx.scene) {
            tracing::warn!(error = %e, "failed to add reticle");
        }

        let opened = ctx
            .channel
            .open(session.as_mut(), self.config.reference_space, tracking);
        ctx.session = Some(session);
        tracing::info!(%generation, "AR session granted");

        match opened {
            Ok(request) => {
                self.in_flight
                    .push(generation, request.map(Completion::HitTestSource).boxed());
            }
            Err(e) => {
                tracing::warn!(error = %e, "hit-testing unavailable; continuing without reticle");
                self.notices.report(&e);
                self.activate();
            }
        }
    }

    fn activate(&mut self) {
        if self.state == SessionState::Starting {
            self.state = SessionState::Active;
            tracing::info!(
                generation = %self.generation,
                hit_test = self.hit_test_available(),
                "session active"
            );
        }
    }

    /// Release everything the current session owns. Safe to call repeatedly.
    fn teardown(&mut self, backend: &mut dyn RenderBackend) {
        let Some(mut ctx) = self.context.take() else {
            self.state = SessionState::Idle;
            return;
        };
        self.state = SessionState::Ending;
        tracing::info!(generation = %ctx.generation, "tearing down session");

        ctx.channel.close();
        ctx.reticle.detach(backend);
        ctx.placement.clear(backend);
        if let Some(light) = ctx.light.take() {
            backend.remove_node(light);
        }
        backend.dispose_scene(ctx.scene);
        backend.detach_surface();

        if let Some(mut session) = ctx.session.take() {
            if let Some(id) = ctx.end_listener.take() {
                session.remove_end_listener(id);
            }
            if !ctx.platform_ended {
                session.end();
            }
        }

        self.pending_selects = 0;
        self.state = SessionState::Idle;
    }
}

fn absorb(error: ArError) {
    tracing::debug!(error = %error, "absorbed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArPlaceConfig;
    use crate::spatial::Point3D;
    use crate::testing::{MockFrame, MockLoader, MockPlatform, RecordingBackend};

    struct Rig {
        lifecycle: SessionLifecycle,
        platform: MockPlatform,
        loader: MockLoader,
        backend: RecordingBackend,
    }

    fn rig(platform: MockPlatform, loader: MockLoader) -> Rig {
        let config = ArPlaceConfig::default();
        let lifecycle = SessionLifecycle::new(
            Box::new(platform.clone()),
            Box::new(loader.clone()),
            config.session.clone(),
            PlacementSettings::from_config(&config),
        );
        Rig {
            lifecycle,
            platform,
            loader,
            backend: RecordingBackend::new(),
        }
    }

    fn started(platform: MockPlatform, loader: MockLoader) -> Rig {
        let mut rig = rig(platform, loader);
        rig.lifecycle.start(&mut rig.backend);
        rig
    }

    fn floor(x: f32) -> Pose {
        Pose::from_translation(Point3D::new(x, -1.4, -1.5))
    }

    impl Rig {
        fn frame(&mut self, frame: &MockFrame) -> bool {
            self.lifecycle.on_frame(frame, &mut self.backend)
        }

        fn select_on(&mut self, frame: &MockFrame) -> bool {
            self.lifecycle.select();
            self.frame(frame)
        }
    }

    #[test]
    fn test_start_reaches_active() {
        let rig = started(MockPlatform::new(), MockLoader::ready());

        assert_eq!(rig.lifecycle.state(), SessionState::Active);
        assert!(rig.lifecycle.hit_test_available());
        assert!(rig.backend.attached);
        assert_eq!(rig.platform.sessions().len(), 1);

        let light = rig.backend.graph.nodes_in(rig.backend.last_scene().unwrap()).count();
        assert_eq!(light, 2);
    }

    #[test]
    fn test_scenario_a_place_then_hide() {
        let mut rig = started(MockPlatform::new(), MockLoader::ready());
        let p1 = floor(0.2);

        rig.frame(&MockFrame::with_hits(vec![p1]));
        let reticle = rig.lifecycle.reticle().unwrap();
        assert_eq!(reticle.pose(), Some(p1));

        rig.select_on(&MockFrame::with_hits(vec![p1]));
        rig.frame(&MockFrame::with_hits(vec![p1]));
        let model = rig.lifecycle.placed().unwrap().clone();
        assert!(model.loaded());
        assert_eq!(*model.transform(), p1);
        assert!(rig.backend.graph.node(model.node()).is_some());

        rig.frame(&MockFrame::empty());
        assert!(!rig.lifecycle.reticle().unwrap().is_visible());

        rig.select_on(&MockFrame::empty());
        assert_eq!(rig.lifecycle.placed(), Some(&model));
        assert_eq!(rig.loader.requests(), 1);
    }

    #[test]
    fn test_scenario_b_no_hit_test_still_renders() {
        let mut rig = started(MockPlatform::without_hit_test(), MockLoader::ready());

        assert_eq!(rig.lifecycle.state(), SessionState::Active);
        assert!(!rig.lifecycle.hit_test_available());
        assert_eq!(
            rig.lifecycle.notices().latest().map(|n| n.kind),
            Some(NoticeKind::Unsupported)
        );

        let frame = MockFrame::with_hits(vec![floor(0.0)]);
        for _ in 0..5 {
            assert!(rig.select_on(&frame));
            assert!(!rig.lifecycle.reticle().unwrap().is_visible());
        }
        assert!(rig.lifecycle.placed().is_none());
        assert_eq!(rig.backend.frames.len(), 5);
        assert_eq!(rig.loader.requests(), 0);
    }

    #[test]
    fn test_scenario_c_double_select_loads_once() {
        let mut rig = started(MockPlatform::new(), MockLoader::pending());
        let frame = MockFrame::with_hits(vec![floor(0.0)]);
        rig.frame(&frame);

        rig.lifecycle.select();
        rig.lifecycle.select();
        assert_eq!(rig.lifecycle.queued_selects(), 2);
        rig.frame(&frame);

        assert_eq!(rig.loader.requests(), 1);
        assert!(rig.lifecycle.is_loading());

        rig.loader.resolve_all();
        rig.frame(&frame);
        assert!(rig.lifecycle.placed().is_some());
        assert_eq!(rig.loader.requests(), 1);
    }

    #[test]
    fn test_scenario_d_stale_load_is_discarded() {
        let mut rig = started(MockPlatform::new(), MockLoader::pending());
        let frame = MockFrame::with_hits(vec![floor(0.0)]);
        rig.frame(&frame);
        rig.select_on(&frame);
        assert!(rig.lifecycle.is_loading());

        rig.platform.sessions()[0].platform_end();
        rig.lifecycle.pump(&mut rig.backend);
        assert_eq!(rig.lifecycle.state(), SessionState::Idle);

        rig.lifecycle.start(&mut rig.backend);
        let second = rig.lifecycle.generation();
        assert_eq!(rig.lifecycle.state(), SessionState::Active);

        rig.loader.resolve_all();
        rig.frame(&frame);

        assert_eq!(rig.lifecycle.generation(), second);
        assert!(rig.lifecycle.placed().is_none());
        assert!(!rig.lifecycle.is_loading());
        let scene = rig.backend.last_scene().unwrap();
        assert!(rig
            .backend
            .graph
            .nodes_in(scene)
            .all(|(_, node)| node.kind != crate::render::NodeKind::Model));

        rig.select_on(&frame);
        assert_eq!(rig.loader.requests(), 2);
    }

    #[test]
    fn test_all_none_never_places() {
        let mut rig = started(MockPlatform::new(), MockLoader::ready());
        for _ in 0..20 {
            rig.select_on(&MockFrame::empty());
            assert!(!rig.lifecycle.reticle().unwrap().is_visible());
        }
        rig.frame(&MockFrame::empty());
        assert!(rig.lifecycle.placed().is_none());
        assert_eq!(rig.loader.requests(), 0);
    }

    #[test]
    fn test_n_selects_track_last_reticle_pose() {
        let mut rig = started(MockPlatform::new(), MockLoader::ready());
        rig.select_on(&MockFrame::with_hits(vec![floor(0.0)]));
        rig.frame(&MockFrame::with_hits(vec![floor(0.0)]));
        assert!(rig.lifecycle.placed().is_some());

        let mut last = floor(0.0);
        for i in 1..=10 {
            last = floor(i as f32 * 0.05);
            rig.select_on(&MockFrame::with_hits(vec![last]));
        }

        let model = rig.lifecycle.placed().unwrap();
        assert_eq!(*model.transform(), last);
        assert_eq!(rig.backend.graph.node(model.node()).unwrap().transform, last);
        assert_eq!(rig.loader.requests(), 1);
    }

    #[test]
    fn test_teardown_twice_equals_once() {
        let mut rig = started(MockPlatform::new(), MockLoader::ready());
        rig.select_on(&MockFrame::with_hits(vec![floor(0.0)]));
        rig.frame(&MockFrame::with_hits(vec![floor(0.0)]));

        rig.lifecycle.exit(&mut rig.backend);
        let session = rig.platform.sessions()[0].record();
        let detaches = rig.backend.detach_calls;
        let nodes = rig.backend.graph.node_count();

        rig.lifecycle.exit(&mut rig.backend);
        rig.lifecycle.reset(&mut rig.backend);

        assert_eq!(rig.lifecycle.state(), SessionState::Idle);
        assert_eq!(rig.platform.sessions()[0].record(), session);
        assert_eq!(rig.backend.detach_calls, detaches);
        assert_eq!(rig.backend.graph.node_count(), nodes);
        assert_eq!(nodes, 0);
        assert_eq!(session.end_calls, 1);
        assert_eq!(session.active_listeners, 0);
    }

    #[test]
    fn test_platform_end_does_not_end_again() {
        let mut rig = started(MockPlatform::new(), MockLoader::ready());
        let session = rig.platform.sessions()[0].clone();

        session.platform_end();
        rig.frame(&MockFrame::empty());

        assert_eq!(rig.lifecycle.state(), SessionState::Idle);
        assert_eq!(session.record().end_calls, 0);
        assert_eq!(rig.backend.detach_calls, 1);
    }

    #[test]
    fn test_refused_session_returns_to_idle() {
        let mut rig = started(MockPlatform::refusing(), MockLoader::ready());

        assert_eq!(rig.lifecycle.state(), SessionState::Idle);
        assert_eq!(
            rig.lifecycle.notices().latest().map(|n| n.kind),
            Some(NoticeKind::Unsupported)
        );
        assert!(!rig.backend.attached);
        assert_eq!(rig.backend.graph.node_count(), 0);
        assert!(!rig.frame(&MockFrame::empty()));
    }

    #[test]
    fn test_stale_session_grant_is_ended() {
        let mut rig = rig(MockPlatform::deferred(), MockLoader::ready());
        rig.lifecycle.start(&mut rig.backend);
        assert_eq!(rig.lifecycle.state(), SessionState::Starting);

        rig.lifecycle.exit(&mut rig.backend);
        rig.platform.grant_deferred();
        rig.lifecycle.pump(&mut rig.backend);

        assert_eq!(rig.lifecycle.state(), SessionState::Idle);
        let sessions = rig.platform.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].record().end_calls, 1);
    }

    #[test]
    fn test_stale_hit_test_source_is_discarded() {
        let mut rig = started(MockPlatform::deferring_sources(), MockLoader::ready());
        assert_eq!(rig.lifecycle.state(), SessionState::Starting);
        let first = rig.platform.sessions()[0].clone();
        assert_eq!(first.record().source_requests, 1);

        first.platform_end();
        rig.lifecycle.pump(&mut rig.backend);
        assert_eq!(rig.lifecycle.state(), SessionState::Idle);

        rig.lifecycle.start(&mut rig.backend);
        assert_eq!(rig.lifecycle.state(), SessionState::Starting);

        first.resolve_source();
        rig.lifecycle.pump(&mut rig.backend);
        assert_eq!(rig.lifecycle.state(), SessionState::Starting);
        assert!(!rig.lifecycle.hit_test_available());
        assert!(!rig.frame(&MockFrame::with_hits(vec![floor(0.0)])));

        rig.platform.sessions()[1].resolve_source();
        rig.lifecycle.pump(&mut rig.backend);
        assert_eq!(rig.lifecycle.state(), SessionState::Active);
        assert!(rig.lifecycle.hit_test_available());
        assert!(rig.frame(&MockFrame::with_hits(vec![floor(0.0)])));
    }

    #[test]
    fn test_exit_while_source_pending_tears_down() {
        let mut rig = started(MockPlatform::deferring_sources(), MockLoader::ready());
        rig.lifecycle.exit(&mut rig.backend);

        let session = rig.platform.sessions()[0].clone();
        assert_eq!(session.record().end_calls, 1);
        assert_eq!(rig.lifecycle.in_flight(), 1);

        session.resolve_source();
        rig.lifecycle.pump(&mut rig.backend);
        assert_eq!(rig.lifecycle.state(), SessionState::Idle);
        assert_eq!(rig.lifecycle.in_flight(), 0);
        assert!(!rig.lifecycle.hit_test_available());
        assert!(!rig.backend.attached);
    }

    #[test]
    fn test_materials_released_across_sessions() {
        let mut rig = started(MockPlatform::new(), MockLoader::ready());
        let frame = MockFrame::with_hits(vec![floor(0.0)]);
        let mut materials = Vec::new();

        for _ in 0..3 {
            rig.select_on(&frame);
            rig.frame(&frame);
            materials.push(rig.lifecycle.placed().unwrap().material());
            rig.lifecycle.exit(&mut rig.backend);
            rig.lifecycle.start(&mut rig.backend);
        }
        rig.lifecycle.exit(&mut rig.backend);

        assert_eq!(rig.backend.graph.node_count(), 0);
        assert_eq!(rig.backend.graph.material_count(), 0);
        assert!(materials
            .iter()
            .all(|m| rig.backend.graph.material(*m).is_none()));
    }

    #[test]
    fn test_invalid_transitions_are_absorbed() {
        let mut rig = rig(MockPlatform::new(), MockLoader::ready());
        assert!(!rig.frame(&MockFrame::empty()));
        rig.lifecycle.select();
        assert_eq!(rig.lifecycle.queued_selects(), 0);

        rig.lifecycle.start(&mut rig.backend);
        let generation = rig.lifecycle.generation();
        rig.lifecycle.start(&mut rig.backend);
        assert_eq!(rig.lifecycle.generation(), generation);
        assert_eq!(rig.platform.sessions().len(), 1);
        assert!(rig.lifecycle.notices().is_empty());
    }

    #[test]
    fn test_failed_load_notifies_and_retries() {
        let mut rig = started(MockPlatform::new(), MockLoader::failing());
        let frame = MockFrame::with_hits(vec![floor(0.0)]);
        rig.select_on(&frame);
        rig.frame(&frame);

        assert!(rig.lifecycle.placed().is_none());
        assert_eq!(
            rig.lifecycle.notices().latest().map(|n| n.kind),
            Some(NoticeKind::LoadFailure)
        );

        rig.select_on(&frame);
        assert_eq!(rig.loader.requests(), 2);
    }

    #[test]
    fn test_wireframe_toggle_keeps_session() {
        let mut rig = started(MockPlatform::new(), MockLoader::ready());
        let frame = MockFrame::with_hits(vec![floor(0.0)]);
        rig.select_on(&frame);
        rig.frame(&frame);
        let generation = rig.lifecycle.generation();
        let model = rig.lifecycle.placed().unwrap().clone();

        rig.lifecycle.set_wireframe(true, &mut rig.backend);

        assert_eq!(rig.lifecycle.generation(), generation);
        assert_eq!(rig.lifecycle.state(), SessionState::Active);
        assert_eq!(rig.lifecycle.placed(), Some(&model));
        assert!(rig.backend.graph.material(model.material()).unwrap().wireframe);
        assert_eq!(rig.platform.sessions().len(), 1);
    }

    #[test]
    fn test_camera_follows_viewer_pose() {
        let mut rig = started(MockPlatform::new(), MockLoader::ready());
        let head = Pose::from_translation(Point3D::new(0.0, 1.6, 0.0));
        rig.frame(&MockFrame::empty().with_viewer(head));

        assert_eq!(rig.backend.frames.last().map(|(_, camera)| *camera), Some(head));
    }

    #[test]
    fn test_resize_forwarded_only_with_session() {
        let mut rig = rig(MockPlatform::new(), MockLoader::ready());
        rig.lifecycle.resize(80, 24, &mut rig.backend);
        assert!(rig.backend.resizes.is_empty());

        rig.lifecycle.start(&mut rig.backend);
        rig.lifecycle.resize(120, 40, &mut rig.backend);
        assert_eq!(rig.backend.resizes, vec![(120, 40)]);
    }
}
