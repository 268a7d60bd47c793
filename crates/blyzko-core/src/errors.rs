//! Database and vocabulary error types.

use thiserror::Error;

/// Errors from loading, validating, or writing the embeddings database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to read or write the artifact file.
    #[error("database I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact is not valid JSON of the expected shape.
    #[error("database JSON invalid: {0}")]
    Json(#[from] serde_json::Error),

    /// A vector's dimension does not match the database dimension.
    #[error("dimension mismatch for \"{word}\": expected {expected}, got {got}")]
    DimensionMismatch {
        /// The offending database key.
        word: String,
        /// Database dimension.
        expected: usize,
        /// Dimension of the rejected vector.
        got: usize,
    },

    /// Two keys normalize to the same canonical word.
    #[error("duplicate normalized key \"{word}\"")]
    DuplicateKey {
        /// The normalized form that collided.
        word: String,
    },

    /// The database contains no entries.
    #[error("database is empty")]
    Empty,
}

/// Result alias for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
