//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a partial
//! JSON file merges cleanly over compiled defaults. Defaults are the
//! production values the shipped Ukrainian vocabulary was built with.

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// Loaded from `~/.blyzko/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values. Example:
///
/// ```json
/// {
///   "embedding": { "dimensions": 384 },
///   "filter": { "noiseWords": ["таргетування"] }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlyzkoSettings {
    /// Settings schema version.
    pub version: String,
    /// Vocabulary filter configuration (corpus builder).
    pub filter: FilterSettings,
    /// Embedding model configuration.
    pub embedding: EmbeddingSettings,
    /// Ranking engine configuration.
    pub engine: EngineSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for BlyzkoSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            filter: FilterSettings::default(),
            embedding: EmbeddingSettings::default(),
            engine: EngineSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Vocabulary filter configuration.
///
/// All predicates are evaluated on the normalized form. The defaults
/// exclude abstract/derivational Ukrainian forms that make poor game
/// targets; both lists are fully configurable for other vocabularies.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSettings {
    /// Minimum word length in characters.
    pub min_length: usize,
    /// Words whose normalized form ends with any of these are discarded.
    pub discard_suffixes: Vec<String>,
    /// Words whose normalized form is literally one of these are discarded.
    pub noise_words: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_length: 3,
            discard_suffixes: ["ція", "ння", "ість", "зм", "кація", "фікація"]
                .map(String::from)
                .to_vec(),
            noise_words: ["таргетування", "махінація", "позиція"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// Embedding model configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingSettings {
    /// ONNX model identifier on the Hugging Face hub.
    pub model: String,
    /// Quantization dtype of the ONNX export (e.g. `"quantized"`, `"fp32"`).
    pub dtype: String,
    /// Embedding dimensions produced by the model.
    pub dimensions: usize,
    /// Local model cache directory (may contain `~`).
    pub cache_dir: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "Xenova/multilingual-e5-small".to_string(),
            dtype: "quantized".to_string(),
            dimensions: 384,
            cache_dir: "~/.blyzko/models".to_string(),
        }
    }
}

/// Ranking engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Size of the per-session closest-words snapshot.
    pub top_k: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { top_k: 500 }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default tracing filter directive (overridden by `RUST_LOG`).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
