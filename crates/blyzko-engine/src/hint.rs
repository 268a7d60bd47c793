//! Hint selection.
//!
//! The engine keeps no guess history — the caller supplies it per call.
//! A hint is a word from the session snapshot strictly better than the
//! caller's current best rank, never rank 1, never already guessed. The
//! random source is injected so tests can assert exact selections.

use std::collections::HashSet;

use rand::Rng;

use blyzko_core::normalize_word;

use crate::protocol::TopEntry;
use crate::session::Session;

/// One prior guess, as the caller recorded it.
#[derive(Clone, Debug)]
pub struct GuessRecord {
    /// The guessed word (any surface form).
    pub word: String,
    /// Its resolved rank; `None` for out-of-vocabulary guesses.
    pub rank: Option<usize>,
}

impl GuessRecord {
    /// Create a record from a resolved guess.
    pub fn new(word: impl Into<String>, rank: Option<usize>) -> Self {
        Self {
            word: word.into(),
            rank,
        }
    }
}

/// Outcome of a hint request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HintOutcome {
    /// A hint word with its authoritative rank.
    Hint {
        /// Original-case word from the snapshot.
        word: String,
        /// Rank resolved through the same path as a real guess.
        rank: usize,
    },
    /// No snapshot word beats the caller's best rank — terminal progress,
    /// not an error.
    Exhausted,
}

/// Pick a hint from the session snapshot, uniformly at random.
pub fn select_hint<R: Rng + ?Sized>(
    session: &Session,
    history: &[GuessRecord],
    rng: &mut R,
) -> HintOutcome {
    let best_rank = history.iter().filter_map(|g| g.rank).min();
    let guessed: HashSet<String> = history
        .iter()
        .map(|g| normalize_word(&g.word))
        .collect();

    let candidates: Vec<&TopEntry> = session
        .top_entries()
        .iter()
        .filter(|e| e.rank >= 2)
        .filter(|e| best_rank.is_none_or(|best| e.rank < best))
        .filter(|e| {
            let normalized = normalize_word(&e.word);
            normalized != session.target() && !guessed.contains(&normalized)
        })
        .collect();

    if candidates.is_empty() {
        return HintOutcome::Exhausted;
    }

    let pick = candidates[rng.random_range(0..candidates.len())];
    // Resolve through the guess path so the returned rank is authoritative.
    let rank = session.resolve_guess(&pick.word).unwrap_or(pick.rank);
    HintOutcome::Hint {
        word: pick.word.clone(),
        rank,
    }
}
