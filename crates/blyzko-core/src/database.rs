//! The embeddings database — the sole persisted artifact of the builder.
//!
//! Serialized as a flat JSON object mapping original-case word to its
//! quantized vector. Insertion order matters at runtime: the ranking pass
//! breaks score ties by database order, so the map must preserve the file's
//! key order — hence [`IndexMap`], not `HashMap`.

use std::path::Path;

use indexmap::IndexMap;

use crate::errors::{DatabaseError, Result};
use crate::normalize::normalize_word;

/// A static mapping from word to quantized embedding vector.
///
/// Invariants, enforced on every construction path:
/// - at least one entry
/// - every vector has the same dimension
/// - no two keys share a normalized form
#[derive(Clone, Debug)]
pub struct EmbeddingsDatabase {
    entries: IndexMap<String, Vec<f32>>,
    dimensions: usize,
}

impl EmbeddingsDatabase {
    /// Build a database from an ordered map, validating all invariants.
    pub fn from_map(entries: IndexMap<String, Vec<f32>>) -> Result<Self> {
        let Some(first) = entries.values().next() else {
            return Err(DatabaseError::Empty);
        };
        let dimensions = first.len();

        let mut seen = std::collections::HashSet::with_capacity(entries.len());
        for (word, vector) in &entries {
            if vector.len() != dimensions {
                return Err(DatabaseError::DimensionMismatch {
                    word: word.clone(),
                    expected: dimensions,
                    got: vector.len(),
                });
            }
            if !seen.insert(normalize_word(word)) {
                return Err(DatabaseError::DuplicateKey {
                    word: normalize_word(word),
                });
            }
        }

        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Parse a database from its JSON artifact text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: IndexMap<String, Vec<f32>> = serde_json::from_str(json)?;
        Self::from_map(entries)
    }

    /// Load a database from a JSON artifact file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Serialize to the compact JSON artifact format.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Write the JSON artifact to disk, returning the byte size written.
    pub fn save(&self, path: &Path) -> Result<u64> {
        let json = self.to_json_string()?;
        std::fs::write(path, &json)?;
        Ok(json.len() as u64)
    }

    /// Vector dimension shared by every entry.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of words in the database.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the database has no entries (never true for a valid one).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion (file) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.entries
            .iter()
            .map(|(word, vector)| (word.as_str(), vector.as_slice()))
    }

    /// Look up a vector by its exact original-case key.
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.entries.get(word).map(Vec::as_slice)
    }
}
