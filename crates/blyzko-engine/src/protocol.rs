//! The command/event wire protocol.
//!
//! Closed tagged enums, exhaustively matched — the wire shapes the host
//! depends on. Serialized as JSON with a `type` discriminator, e.g.
//! `{"type":"guess","target":"кіт","guess":"пес"}` and
//! `{"type":"result","word":"пес","rank":2}`. An out-of-vocabulary guess
//! carries `"rank":null`; how to render "unranked" is the host's decision.

use serde::{Deserialize, Serialize};

/// Commands from the host to the engine worker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Begin a new game session for a target word.
    Start {
        /// The hidden target word.
        target: String,
    },
    /// Resolve a guess against the live session.
    Guess {
        /// The session's target (host bookkeeping; the engine resolves
        /// against the live session and warns on mismatch).
        target: String,
        /// The guessed word.
        guess: String,
    },
}

/// Events from the engine worker to the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Model and database loaded; the worker is idle.
    Ready,
    /// Loading telemetry for a model file download.
    DownloadProgress {
        /// Completion fraction in `[0, 1]`.
        progress: f32,
        /// Repo-relative file being fetched.
        file: String,
    },
    /// `start` completed; a session is live.
    InitDone {
        /// The closest words to the target, ascending by rank.
        top500: Vec<TopEntry>,
    },
    /// A `guess` resolved.
    Result {
        /// The original guess text, untouched.
        word: String,
        /// Resolved rank, or `None` for words outside the vocabulary.
        rank: Option<usize>,
    },
    /// The current command failed; state is unchanged and retriable.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

/// One entry of the per-session closest-words snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopEntry {
    /// Original-case database key.
    pub word: String,
    /// 1-based rank in the session's order.
    pub rank: usize,
}
