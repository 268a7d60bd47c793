//! # blyzko-engine
//!
//! The online Similarity Ranking Engine.
//!
//! One [`Engine`] per process holds the loaded embedding service and
//! database; each `start` builds a fresh [`Session`] — a total order over
//! the vocabulary by semantic distance to the target — and guesses resolve
//! against it in O(1). Commands flow through a strict FIFO
//! [`worker::EngineWorker`] so a ranking pass can never interleave with a
//! guess.

#![deny(unsafe_code)]

pub mod engine;
pub mod errors;
pub mod hint;
pub mod protocol;
pub mod session;
pub mod worker;

pub use engine::Engine;
pub use errors::{EngineError, Result};
pub use hint::{GuessRecord, HintOutcome, select_hint};
pub use protocol::{Command, Event, TopEntry};
pub use session::Session;
pub use worker::{EngineLoader, EngineWorker};
