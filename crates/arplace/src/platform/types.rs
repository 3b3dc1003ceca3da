//! Handles and capability descriptors exchanged with the AR platform

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spatial::Pose;

/// Session features a platform may advertise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    HitTest,
    DomOverlay,
    LightEstimation,
    Anchors,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::HitTest => "hit-test",
            Capability::DomOverlay => "dom-overlay",
            Capability::LightEstimation => "light-estimation",
            Capability::Anchors => "anchors",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Features requested when a session is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub required: Vec<Capability>,
    pub optional: Vec<Capability>,
}

impl CapabilitySet {
    pub fn new(required: Vec<Capability>, optional: Vec<Capability>) -> Self {
        Self { required, optional }
    }

    pub fn requires(&self, capability: Capability) -> bool {
        self.required.contains(&capability)
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self {
            required: vec![Capability::HitTest],
            optional: vec![Capability::DomOverlay],
        }
    }
}

/// Coordinate frame kinds a session can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSpaceKind {
    /// Origin tracks the device itself
    Viewer,
    /// Origin fixed near the device position at session start
    Local,
    LocalFloor,
}

/// Opaque reference space handle issued by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceSpace {
    id: u64,
    kind: ReferenceSpaceKind,
}

impl ReferenceSpace {
    pub fn new(id: u64, kind: ReferenceSpaceKind) -> Self {
        Self { id, kind }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ReferenceSpaceKind {
        self.kind
    }
}

/// Opaque hit-test source bound to the reference space it was requested with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitTestSource {
    id: u64,
    space: ReferenceSpace,
}

impl HitTestSource {
    pub fn new(id: u64, space: ReferenceSpace) -> Self {
        Self { id, space }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn space(&self) -> ReferenceSpace {
        self.space
    }
}

/// One candidate surface intersection for the current frame.
///
/// The pose is in the platform's native tracking frame; ask the frame to
/// express it in a particular reference space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTestResult {
    native_pose: Pose,
}

impl HitTestResult {
    pub fn new(native_pose: Pose) -> Self {
        Self { native_pose }
    }

    pub fn native_pose(&self) -> &Pose {
        &self.native_pose
    }
}

/// Registration handle for a session end listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);
