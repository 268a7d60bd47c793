//! # blyzko-core
//!
//! Foundation types for the blyzko semantic ranking subsystem:
//!
//! - **Normalization**: trim + lowercase canonical word keys
//! - **Vector math**: L2 norm/normalize, dot product, 4-decimal quantization
//! - **Embeddings database**: the insertion-ordered word → vector artifact
//! - **Vocabulary**: the raw word-list file both the builder and host read

#![deny(unsafe_code)]

pub mod database;
pub mod errors;
pub mod normalize;
pub mod vector;
pub mod vocabulary;

pub use database::EmbeddingsDatabase;
pub use errors::{DatabaseError, Result};
pub use normalize::normalize_word;
