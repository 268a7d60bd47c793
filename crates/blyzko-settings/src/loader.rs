//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`BlyzkoSettings::default()`]
//! 2. If `~/.blyzko/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::BlyzkoSettings;

/// Resolve the path to the settings file (`~/.blyzko/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".blyzko").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<BlyzkoSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<BlyzkoSettings> {
    let defaults = serde_json::to_value(BlyzkoSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: BlyzkoSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are logged and ignored (fall back to file/default).
pub fn apply_env_overrides(settings: &mut BlyzkoSettings) {
    if let Some(v) = read_env_string("BLYZKO_MODEL") {
        settings.embedding.model = v;
    }
    if let Some(v) = read_env_string("BLYZKO_DTYPE") {
        settings.embedding.dtype = v;
    }
    if let Some(v) = read_env_usize("BLYZKO_DIMENSIONS", 1, 8192) {
        settings.embedding.dimensions = v;
    }
    if let Some(v) = read_env_string("BLYZKO_CACHE_DIR") {
        settings.embedding.cache_dir = v;
    }
    if let Some(v) = read_env_usize("BLYZKO_TOP_K", 1, 100_000) {
        settings.engine.top_k = v;
    }
    if let Some(v) = read_env_usize("BLYZKO_MIN_WORD_LENGTH", 1, 64) {
        settings.filter.min_length = v;
    }
    if let Some(v) = read_env_string("BLYZKO_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}
