//! The engine context object.
//!
//! Owns the loaded embedding service and database for the process lifetime
//! and hands out per-session ranking state. Both handles are read-only
//! after loading and shared without locking; sessions never mutate them.

use std::sync::Arc;

use blyzko_core::EmbeddingsDatabase;
use blyzko_embeddings::{EmbeddingService, query_text};

use crate::errors::{EngineError, Result};
use crate::session::{DEFAULT_TOP_K, Session};

/// The similarity ranking engine.
///
/// Constructed once by the host after the model and database are loaded;
/// reusable across any number of sessions without reloading either.
pub struct Engine {
    service: Arc<dyn EmbeddingService>,
    database: Arc<EmbeddingsDatabase>,
    top_k: usize,
}

impl Engine {
    /// Create an engine over a loaded service and database.
    pub fn new(service: Arc<dyn EmbeddingService>, database: Arc<EmbeddingsDatabase>) -> Self {
        Self {
            service,
            database,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override the closest-words snapshot size.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// The loaded database.
    pub fn database(&self) -> &Arc<EmbeddingsDatabase> {
        &self.database
    }

    /// Start a new session: embed the target with the shared `"query: "`
    /// convention and rank the whole vocabulary against it.
    ///
    /// This is the dominant per-game cost — model inference plus an O(N·D)
    /// sweep — so the sweep runs on the blocking pool. The previous
    /// session (if the caller holds one) is simply replaced wholesale.
    pub async fn start_session(&self, target: &str) -> Result<Session> {
        let target_vector = self.service.embed_single(&query_text(target)).await?;
        if target_vector.len() != self.database.dimensions() {
            return Err(EngineError::DimensionMismatch {
                expected: self.database.dimensions(),
                got: target_vector.len(),
            });
        }

        let database = Arc::clone(&self.database);
        let top_k = self.top_k;
        let target = target.to_string();
        tokio::task::spawn_blocking(move || {
            Session::compute(&target, &target_vector, &database, top_k)
        })
        .await
        .map_err(|e| EngineError::Internal(format!("ranking task failed: {e}")))
    }
}
