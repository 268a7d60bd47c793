//! # blyzko-embeddings
//!
//! The Embedding Vector Source seam for blyzko.
//!
//! - [`EmbeddingService`]: async trait over `embed(texts) -> vectors`
//! - [`query_text`]: the single `"query: "` convention shared by the corpus
//!   builder and the ranking engine — the model is convention-sensitive, so
//!   both sides must feed it byte-identical text
//! - [`MockEmbeddingService`]: deterministic sha2-seeded vectors for tests
//! - `OnnxEmbeddingService` (feature `ort`): multilingual-e5-small via
//!   `hf-hub` + `tokenizers` + `ort`, mean pooling, L2 normalization

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
#[cfg(feature = "ort")]
pub mod ort_service;
pub mod query;
pub mod service;

pub use config::EmbeddingConfig;
pub use errors::{EmbeddingError, Result};
pub use query::query_text;
pub use service::{
    DownloadProgress, EmbeddingService, MockEmbeddingService, ProgressCallback,
};
