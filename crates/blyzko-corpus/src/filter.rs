//! Vocabulary filtering.
//!
//! Predicates run in a fixed order on the normalized form: length, suffix
//! blacklist, noise-word set. Surviving words keep their original surface
//! form; duplicates by normalized form keep the first occurrence.

use std::collections::HashSet;

use blyzko_core::normalize_word;
use blyzko_settings::types::FilterSettings;

/// Filter configuration for a corpus build.
#[derive(Clone, Debug)]
pub struct FilterConfig {
    /// Minimum word length in characters.
    pub min_length: usize,
    /// Discard words whose normalized form ends with any of these.
    pub discard_suffixes: Vec<String>,
    /// Discard words whose normalized form is literally one of these.
    pub noise_words: HashSet<String>,
}

impl FilterConfig {
    /// Create config from settings; noise words are normalized on the way in.
    pub fn from_settings(s: &FilterSettings) -> Self {
        Self {
            min_length: s.min_length,
            discard_suffixes: s.discard_suffixes.clone(),
            noise_words: s.noise_words.iter().map(|w| normalize_word(w)).collect(),
        }
    }

    /// Whether a normalized word survives the pipeline.
    pub fn keeps(&self, normalized: &str) -> bool {
        if normalized.chars().count() < self.min_length {
            return false;
        }
        if self
            .discard_suffixes
            .iter()
            .any(|s| normalized.ends_with(s.as_str()))
        {
            return false;
        }
        !self.noise_words.contains(normalized)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::from_settings(&FilterSettings::default())
    }
}

/// Result of filtering a raw vocabulary.
#[derive(Clone, Debug)]
pub struct FilteredVocabulary {
    /// Surviving words, original surface forms, input order.
    pub kept: Vec<String>,
    /// Number of discarded words (filtered or normalized duplicates).
    pub discarded: usize,
}

/// Apply the filter pipeline and normalized-form dedup to a vocabulary.
pub fn filter_vocabulary(words: &[String], config: &FilterConfig) -> FilteredVocabulary {
    let mut kept = Vec::with_capacity(words.len());
    let mut seen = HashSet::with_capacity(words.len());

    for word in words {
        let normalized = normalize_word(word);
        if !config.keeps(&normalized) {
            continue;
        }
        if !seen.insert(normalized) {
            continue;
        }
        kept.push(word.clone());
    }

    let discarded = words.len() - kept.len();
    FilteredVocabulary { kept, discarded }
}
