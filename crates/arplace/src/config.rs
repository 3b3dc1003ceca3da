//! TOML configuration for sessions, materials, the camera and the model catalog

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::platform::{Capability, CapabilitySet, ReferenceSpaceKind};
use crate::render::MaterialConfig;

/// Top-level configuration; every section falls back to its defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArPlaceConfig {
    pub session: SessionConfig,
    pub material: MaterialConfig,
    pub camera: CameraConfig,
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub required_features: Vec<Capability>,
    pub optional_features: Vec<Capability>,
    /// Space hit-test rays are cast from; only `viewer` passes validation
    pub reference_space: ReferenceSpaceKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let features = CapabilitySet::default();
        Self {
            required_features: features.required,
            optional_features: features.optional,
            reference_space: ReferenceSpaceKind::Viewer,
        }
    }
}

impl SessionConfig {
    pub fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(self.required_features.clone(), self.optional_features.clone())
    }
}

/// Perspective camera parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 70.0,
            near: 0.01,
            far: 20.0,
        }
    }
}

/// One selectable model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub url: String,
}

impl ModelEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl ArPlaceConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), models = config.models.len(), "loaded config");
        Ok(config)
    }

    /// The catalog, or the built-in cone when none is configured
    pub fn model_catalog(&self) -> Vec<ModelEntry> {
        if self.models.is_empty() {
            vec![ModelEntry::new("cone", "models/cone.glb")]
        } else {
            self.models.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.session.required_features.contains(&Capability::HitTest) {
            return Err(ConfigError::Invalid(
                "session.required_features must include \"hit-test\"".to_string(),
            ));
        }
        if self.session.reference_space != ReferenceSpaceKind::Viewer {
            return Err(ConfigError::Invalid(format!(
                "session.reference_space must be \"viewer\", got {:?}",
                self.session.reference_space
            )));
        }

        for (field, value) in [
            ("metalness", self.material.metalness),
            ("roughness", self.material.roughness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "material.{} must be within [0, 1], got {}",
                    field, value
                )));
            }
        }

        let camera = &self.camera;
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov must be within (0, 180), got {}",
                camera.fov
            )));
        }
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::Invalid(
                "camera.near must be positive and below camera.far".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for model in &self.models {
            if model.name.trim().is_empty() || model.url.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "model entries need a name and a url".to_string(),
                ));
            }
            if !seen.insert(model.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate model name '{}'",
                    model.name
                )));
            }
        }

        Ok(())
    }
}
