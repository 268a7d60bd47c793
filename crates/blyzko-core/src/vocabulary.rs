//! Vocabulary file reader.
//!
//! The vocabulary is a JSON array of raw word strings. The corpus builder
//! consumes it as input; the host reads the same file to pick a random
//! target for a new session. The ranking engine never reads it.

use std::path::Path;

use crate::errors::Result;

/// Load a vocabulary from a JSON array file, preserving order.
pub fn load_vocabulary(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
