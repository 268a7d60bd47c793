//! # blyzko-corpus
//!
//! The offline corpus builder: filters a raw vocabulary, embeds each
//! surviving word through the shared query convention, quantizes the
//! vectors, and produces the embeddings database artifact.
//!
//! Build failures are fail-fast: a single embedding error aborts the whole
//! build, because a partial database would silently degrade every future
//! game.

#![deny(unsafe_code)]

pub mod builder;
pub mod errors;
pub mod filter;

pub use builder::{BuildReport, build};
pub use errors::{BuildError, Result};
pub use filter::FilterConfig;
