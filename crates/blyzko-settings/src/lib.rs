//! # blyzko-settings
//!
//! Typed configuration for the corpus builder and ranking engine.
//!
//! Loading flow mirrors the rest of the `~/.blyzko` layout:
//! compiled defaults → deep merge of `~/.blyzko/settings.json` → `BLYZKO_*`
//! environment overrides.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use types::BlyzkoSettings;
