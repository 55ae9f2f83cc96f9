/// Crate-wide result alias.
pub type ScrubResult<T> = Result<T, ScrubError>;

/// Errors surfaced by configuration, construction and asset helpers.
///
/// The per-tick runtime path never returns these: load failures, degenerate geometry and stale
/// completions are absorbed where they happen.
#[derive(thiserror::Error, Debug)]
pub enum ScrubError {
    /// Invalid configuration or out-of-range request.
    #[error("validation error: {0}")]
    Validation(String),

    /// A frame resource could not be retrieved or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Loader setup failure.
    #[error("loader error: {0}")]
    Loader(String),

    /// Canvas/surface failure.
    #[error("render error: {0}")]
    Render(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its context chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrubError {
    /// Build a [`ScrubError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScrubError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`ScrubError::Loader`].
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::Loader(msg.into())
    }

    /// Build a [`ScrubError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ScrubError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
