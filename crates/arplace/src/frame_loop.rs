//! Per-refresh driver

use crate::lifecycle::{SessionLifecycle, SessionState};
use crate::platform::ArFrame;
use crate::render::RenderBackend;

/// Counters kept across every session the loop has driven
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Display refreshes delivered
    pub ticks: u64,
    /// Frames submitted to the backend
    pub rendered: u64,
    /// Refreshes that arrived with no active session
    pub absorbed: u64,
}

/// Owns the render backend and steps the pipeline once per display refresh
pub struct FrameLoop<B: RenderBackend> {
    lifecycle: SessionLifecycle,
    backend: B,
    stats: FrameStats,
}

impl<B: RenderBackend> FrameLoop<B> {
    pub fn new(lifecycle: SessionLifecycle, backend: B) -> Self {
        Self {
            lifecycle,
            backend,
            stats: FrameStats::default(),
        }
    }

    /// Run one pipeline step for `frame`
    pub fn on_frame(&mut self, frame: &dyn ArFrame) -> bool {
        self.stats.ticks += 1;
        let rendered = self.lifecycle.on_frame(frame, &mut self.backend);
        if rendered {
            self.stats.rendered += 1;
        } else {
            self.stats.absorbed += 1;
        }
        rendered
    }

    /// Apply finished async work between frames
    pub fn pump(&mut self) {
        self.lifecycle.pump(&mut self.backend);
    }

    pub fn start(&mut self) {
        self.lifecycle.start(&mut self.backend);
    }

    pub fn select(&mut self) {
        self.lifecycle.select();
    }

    pub fn exit(&mut self) {
        self.lifecycle.exit(&mut self.backend);
    }

    pub fn reset(&mut self) {
        self.lifecycle.reset(&mut self.backend);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.lifecycle.resize(width, height, &mut self.backend);
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.lifecycle.set_wireframe(wireframe, &mut self.backend);
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.state() == SessionState::Active
    }

    pub fn lifecycle(&self) -> &SessionLifecycle {
        &self.lifecycle
    }

    pub fn lifecycle_mut(&mut self) -> &mut SessionLifecycle {
        &mut self.lifecycle
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}
