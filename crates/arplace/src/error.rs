//! Error taxonomy for the placement pipeline.

/// Errors raised by the AR pipeline.
///
/// `Unsupported` and `LoadFailure` are recoverable and surface as user-facing
/// notices. `InvariantViolation` is logged and absorbed, never shown.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArError {
    #[error("AR not supported: {0}")]
    Unsupported(String),

    #[error("Model failed to load: {0}")]
    LoadFailure(#[from] LoadError),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl ArError {
    /// Whether this error should be shown to the user
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ArError::InvariantViolation(_))
    }
}

/// Rejection reported by a model loader.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("load cancelled: {0}")]
    Cancelled(String),
}

/// Failure inside a render backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(String),

    #[error("frame error: {0}")]
    Frame(String),

    #[error("unknown scene {0}")]
    UnknownScene(u64),

    #[error("unknown node {0}")]
    UnknownNode(u64),

    #[error("unknown material {0}")]
    UnknownMaterial(u64),
}

/// Configuration could not be read or is inconsistent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ArError>;
