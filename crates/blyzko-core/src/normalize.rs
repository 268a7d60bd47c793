//! Word normalization — the canonical key for every lookup.
//!
//! Two surface forms that normalize identically are indistinguishable to
//! the engine, so every comparison in the builder and the engine must go
//! through [`normalize_word`] first.

/// Normalize a word: trim surrounding whitespace, then lowercase.
///
/// Lowercasing is full Unicode (the default vocabulary is Ukrainian).
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}
