//! Corpus build error types.

use thiserror::Error;

use blyzko_core::DatabaseError;
use blyzko_embeddings::EmbeddingError;

/// Errors that abort a corpus build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Embedding a single word failed; the whole build is aborted.
    #[error("embedding \"{word}\" failed: {source}")]
    Embed {
        /// The word whose embedding call failed.
        word: String,
        /// The underlying service error.
        #[source]
        source: EmbeddingError,
    },

    /// Every input word was filtered out.
    #[error("no words survived filtering")]
    EmptyCorpus,

    /// The assembled database violated an invariant.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Result alias for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
