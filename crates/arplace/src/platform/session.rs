//! Platform, session and per-frame traits

use futures::future::BoxFuture;

use crate::error::ArError;
use crate::spatial::Pose;
use super::{
    Capability, CapabilitySet, HitTestResult, HitTestSource, ListenerId, ReferenceSpace,
    ReferenceSpaceKind,
};

/// Callback fired once when the platform ends a session
pub type EndCallback = Box<dyn FnMut() + Send>;

/// Entry point into the device's AR subsystem
pub trait ArPlatform {
    /// Request an immersive AR session.
    ///
    /// Resolves to `ArError::Unsupported` when the device cannot satisfy
    /// `capabilities.required`.
    fn request_session(
        &mut self,
        capabilities: &CapabilitySet,
    ) -> BoxFuture<'static, Result<Box<dyn ArSession>, ArError>>;
}

/// A live AR session
pub trait ArSession: Send {
    /// Whether the session was granted `capability`
    fn supports(&self, capability: Capability) -> bool;

    fn request_reference_space(
        &mut self,
        kind: ReferenceSpaceKind,
    ) -> Result<ReferenceSpace, ArError>;

    /// Resolves to `None` when the platform declines to create a source
    fn request_hit_test_source(
        &mut self,
        space: &ReferenceSpace,
    ) -> BoxFuture<'static, Option<HitTestSource>>;

    /// Register a listener for platform-initiated session end
    fn on_end(&mut self, callback: EndCallback) -> ListenerId;

    fn remove_end_listener(&mut self, id: ListenerId);

    /// End the session from the application side; repeated calls are no-ops
    fn end(&mut self);
}

/// Tracking data for one display refresh
pub trait ArFrame {
    /// Pose of the viewer expressed in `space`
    fn viewer_pose(&self, space: &ReferenceSpace) -> Option<Pose>;

    /// Hit-test results for `source`, best candidate first
    fn hit_test_results(&self, source: &HitTestSource) -> Vec<HitTestResult>;

    /// Express a result's pose in `space`
    fn result_pose(&self, result: &HitTestResult, space: &ReferenceSpace) -> Option<Pose>;
}
