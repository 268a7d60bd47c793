//! Engine error types.
//!
//! Engine errors never crash the process: the worker surfaces them as
//! `error` events and stays in its last stable state, so the host can
//! retry the command.

use thiserror::Error;

use blyzko_embeddings::EmbeddingError;

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Loading the model or the database failed.
    #[error("load failed: {0}")]
    Load(String),

    /// Embedding the target word failed.
    #[error(transparent)]
    Embed(#[from] EmbeddingError),

    /// The target's vector dimension does not match the database.
    #[error("target vector is {got}d, database is {expected}d")]
    DimensionMismatch {
        /// Database dimension.
        expected: usize,
        /// Dimension the service produced.
        got: usize,
    },

    /// Generic internal error.
    #[error("{0}")]
    Internal(String),
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
