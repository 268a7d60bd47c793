//! The [`EmbeddingService`] trait and the deterministic mock backend.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use blyzko_core::vector::l2_normalize;

use crate::errors::{EmbeddingError, Result};

/// Download progress for a single model file.
#[derive(Clone, Debug)]
pub struct DownloadProgress {
    /// Repo-relative file being fetched.
    pub file: String,
    /// Completion fraction in `[0, 1]`.
    pub progress: f32,
}

/// Callback invoked with loading telemetry.
pub type ProgressCallback = std::sync::Arc<dyn Fn(DownloadProgress) + Send + Sync>;

/// A pretrained text-embedding model.
///
/// Implementations return unit-length vectors of a fixed dimension. The
/// builder and the engine both call this through [`crate::query_text`], so
/// an implementation never sees raw, unprefixed words.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a batch of texts, one vector per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::Internal("empty embedding batch".into()))
    }

    /// Whether the model is loaded and inference can run.
    fn is_ready(&self) -> bool;

    /// Dimension of produced vectors.
    fn dimensions(&self) -> usize;
}

/// Deterministic in-memory embedding service for tests.
///
/// Unknown texts get a sha2-derived unit vector (same text → same vector,
/// across runs and platforms). Tests that need exact geometry can pin
/// vectors for specific inputs.
pub struct MockEmbeddingService {
    dimensions: usize,
    pinned: RwLock<HashMap<String, Vec<f32>>>,
}

impl MockEmbeddingService {
    /// Create a mock producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            pinned: RwLock::new(HashMap::new()),
        }
    }

    /// Pin the exact vector returned for a text.
    pub fn pin(&self, text: impl Into<String>, vector: Vec<f32>) {
        assert_eq!(vector.len(), self.dimensions, "pinned vector dimension");
        let _ = self.pinned.write().insert(text.into(), vector);
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        if let Some(v) = self.pinned.read().get(text) {
            return v.clone();
        }

        let mut components = Vec::with_capacity(self.dimensions);
        let mut counter: u32 = 0;
        while components.len() < self.dimensions {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            hasher.update(counter.to_le_bytes());
            let digest = hasher.finalize();
            for chunk in digest.chunks_exact(4) {
                if components.len() == self.dimensions {
                    break;
                }
                let n = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                #[allow(clippy::cast_precision_loss)]
                components.push((n as f32 / u32::MAX as f32).mul_add(2.0, -1.0));
            }
            counter += 1;
        }
        l2_normalize(&mut components);
        components
    }
}

#[async_trait]
impl EmbeddingService for MockEmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
