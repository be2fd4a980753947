use thiserror::Error;

/// Domain-level errors shared across application components.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The incoming payload missed a required field or violated invariants.
    #[error("validation error: {0}")]
    Validation(String),

    /// The similarity index failed while looking up reference passages.
    #[error("retrieval failure: {0}")]
    Retrieval(String),

    /// The text generator failed or returned an unusable payload.
    #[error("generation failure: {0}")]
    Generation(String),

    /// Catch-all for passage-index storage failures we don't want to leak directly.
    #[error("index failure: {0}")]
    Index(String),

    /// Embedding engine incompatibility (e.g., dimension mismatch).
    #[error("embedding mismatch: {0}")]
    Embedding(String),

    /// Any other unexpected failure.
    #[error("unexpected error: {0}")]
    Other(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::Retrieval(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn index(msg: impl Into<String>) -> Self {
        Self::Index(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
