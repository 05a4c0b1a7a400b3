/// Crate-wide result alias.
pub type LoopforgeResult<T> = Result<T, LoopforgeError>;

/// Error taxonomy for the generation pipeline.
///
/// `Validation` covers bad caller input (rejected before any filesystem
/// activity). The stage variants (`Render`, `Audio`, `Encode`) are fatal to a
/// run. `Publish` never escapes the distributor; it is captured per platform
/// as a result entry instead.
#[derive(thiserror::Error, Debug)]
pub enum LoopforgeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("publish error: {0}")]
    Publish(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoopforgeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    /// `true` when the error should surface as a client error (bad input)
    /// rather than a pipeline failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
