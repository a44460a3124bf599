/// Convenience result type used across ldiview.
pub type LdiResult<T> = Result<T, LdiError>;

/// Top-level error taxonomy used by renderer APIs.
///
/// Sampling misses, depth-edge rejections and mask rejections are never errors; they resolve to
/// transparent samples inside the ray caster.
#[derive(thiserror::Error, Debug)]
pub enum LdiError {
    /// Invalid user-provided scene, camera or option data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Fatal pipeline setup failure; no frame can be produced.
    #[error("setup error: {0}")]
    Setup(String),

    /// Asset decoding or lookup failure while loading a view.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors when serializing or deserializing manifests and options.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LdiError {
    /// Build a [`LdiError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LdiError::Setup`] value.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Build a [`LdiError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`LdiError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
