//! Embedding error types.

use thiserror::Error;

/// Errors from embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Model initialization failed.
    #[error("model initialization failed: {0}")]
    ModelInit(String),

    /// Inference failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Service not ready (model not loaded).
    #[error("embedding service not ready")]
    NotReady,

    /// Generic internal error.
    #[error("{0}")]
    Internal(String),
}

/// Result alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;
