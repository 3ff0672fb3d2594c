/// Convenience result type used across the playback engine.
pub type StageResult<T> = Result<T, StageError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Per-instruction dispatch never surfaces these: it logs and continues. They are returned by
/// loading, parsing and configuration entry points.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    /// Invalid user-provided settings or scenario data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced asset is missing, failed to download, or failed to decode.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors raised by animation scheduling.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors while resolving or loading a scenario script.
    #[error("scenario error: {0}")]
    Scenario(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StageError {
    /// Build a [`StageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StageError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`StageError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`StageError::Scenario`] value.
    pub fn scenario(msg: impl Into<String>) -> Self {
        Self::Scenario(msg.into())
    }

    /// Build a [`StageError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
