//! AR session and hit-test subsystem abstraction
//!
//! The device tracking stack is an external collaborator. It supplies
//! sessions, reference spaces and hit-test sources; the pipeline only
//! consumes them through these traits.

mod session;
mod types;

pub use session::{ArFrame, ArPlatform, ArSession, EndCallback};
pub use types::{
    Capability, CapabilitySet, HitTestResult, HitTestSource, ListenerId, ReferenceSpace,
    ReferenceSpaceKind,
};
