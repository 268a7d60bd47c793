//! The retrieval-style query convention.
//!
//! multilingual-e5 models are trained with task prefixes; a word embedded
//! with the prefix and compared against one embedded without it produces
//! silently wrong similarities. Build time and query time therefore share
//! this one function — nothing else in the workspace formats model input.

use blyzko_core::normalize_word;

/// The fixed prefix fed to the embedding model.
pub const QUERY_PREFIX: &str = "query: ";

/// Build the exact model input for a word: `"query: " + normalized(word)`.
pub fn query_text(word: &str) -> String {
    format!("{QUERY_PREFIX}{}", normalize_word(word))
}
