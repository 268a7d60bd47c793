//! Per-session ranking state.
//!
//! A [`Session`] is built once per `start` by a full O(N·D) pass over the
//! database and is immutable afterwards; guesses resolve against it in
//! O(1). The pass never re-runs on a guess.

use std::cmp::Ordering;
use std::collections::HashMap;

use blyzko_core::vector::dot;
use blyzko_core::{EmbeddingsDatabase, normalize_word};

use crate::protocol::TopEntry;

/// Default size of the closest-words snapshot.
pub const DEFAULT_TOP_K: usize = 500;

/// A live game session: the target, the rank table, and the top-K snapshot.
#[derive(Clone, Debug)]
pub struct Session {
    target: String,
    ranks: HashMap<String, usize>,
    top: Vec<TopEntry>,
    vocabulary_size: usize,
}

impl Session {
    /// Rank the whole vocabulary against a target vector.
    ///
    /// Scores are dot products — the database vectors and the target vector
    /// are unit-length, so this is cosine similarity without the norm
    /// division. The sort is stable and descending: equal scores keep the
    /// database's insertion order, which makes rank assignment reproducible
    /// across runs. After positional assignment the target's own rank is
    /// force-set to 1; floating-point self-similarity or a target missing
    /// from the vocabulary could otherwise leave it above rank 1.
    pub fn compute(
        target: &str,
        target_vector: &[f32],
        database: &EmbeddingsDatabase,
        top_k: usize,
    ) -> Self {
        let target = normalize_word(target);

        let mut scored: Vec<(&str, f32)> = database
            .iter()
            .map(|(word, vector)| (word, dot(target_vector, vector)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut ranks = HashMap::with_capacity(scored.len() + 1);
        let mut top = Vec::with_capacity(top_k.min(scored.len()));
        for (i, (word, _)) in scored.iter().enumerate() {
            let rank = i + 1;
            let _ = ranks.insert(normalize_word(word), rank);
            if i < top_k {
                top.push(TopEntry {
                    word: (*word).to_string(),
                    rank,
                });
            }
        }
        let _ = ranks.insert(target.clone(), 1);

        Self {
            target,
            ranks,
            top,
            vocabulary_size: database.len(),
        }
    }

    /// The normalized target word.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Number of words that were ranked.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    /// Resolve a guess to its rank, or `None` for out-of-vocabulary words.
    ///
    /// An exact normalized match with the target short-circuits to rank 1
    /// before any lookup, so the literal target always wins even when its
    /// measured self-similarity fell below 1.0.
    pub fn resolve_guess(&self, guess: &str) -> Option<usize> {
        let normalized = normalize_word(guess);
        if normalized == self.target {
            return Some(1);
        }
        self.ranks.get(&normalized).copied()
    }

    /// The closest-words snapshot, ascending by rank.
    pub fn top_entries(&self) -> &[TopEntry] {
        &self.top
    }
}
