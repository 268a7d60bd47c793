//! Embedding configuration.

use serde::{Deserialize, Serialize};

use blyzko_settings::types::EmbeddingSettings;

/// Configuration for the embedding backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingConfig {
    /// ONNX model identifier on the Hugging Face hub.
    pub model: String,
    /// Quantization dtype of the ONNX export.
    pub dtype: String,
    /// Embedding dimensions the model produces.
    pub dimensions: usize,
    /// Local model cache directory (may contain `~`).
    pub cache_dir: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::from_settings(&EmbeddingSettings::default())
    }
}

impl EmbeddingConfig {
    /// Create config from settings.
    pub fn from_settings(s: &EmbeddingSettings) -> Self {
        Self {
            model: s.model.clone(),
            dtype: s.dtype.clone(),
            dimensions: s.dimensions,
            cache_dir: s.cache_dir.clone(),
        }
    }

    /// Resolve the cache directory, expanding `~/` to the home directory.
    pub fn resolved_cache_dir(&self) -> String {
        if self.cache_dir.starts_with("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return format!("{}{}", home, &self.cache_dir[1..]);
            }
        }
        self.cache_dir.clone()
    }

    /// Repo-relative path of the ONNX graph for the configured dtype.
    pub fn model_filename(&self) -> String {
        if self.dtype == "fp32" {
            "onnx/model.onnx".to_string()
        } else {
            format!("onnx/model_{}.onnx", self.dtype)
        }
    }
}
