//! ONNX Runtime embedding service (feature-gated behind `ort`).
//!
//! Downloads the multilingual-e5-small ONNX export via `hf-hub`, tokenizes
//! with `tokenizers`, runs inference via `ort`, then applies mean-over-tokens
//! pooling and L2 normalization — the exact post-processing the shipped
//! database was generated with.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use blyzko_core::vector::l2_normalize;

use crate::config::EmbeddingConfig;
use crate::errors::{EmbeddingError, Result};
use crate::service::{DownloadProgress, EmbeddingService, ProgressCallback};

/// ONNX-based embedding service using multilingual-e5-small.
pub struct OnnxEmbeddingService {
    config: EmbeddingConfig,
    session: parking_lot::Mutex<Option<ort::session::Session>>,
    tokenizer: parking_lot::Mutex<Option<tokenizers::Tokenizer>>,
    ready: AtomicBool,
}

impl OnnxEmbeddingService {
    /// Create a new ONNX embedding service (not yet initialized).
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            config,
            session: parking_lot::Mutex::new(None),
            tokenizer: parking_lot::Mutex::new(None),
            ready: AtomicBool::new(false),
        }
    }

    /// Initialize the service: download model + tokenizer, create the ONNX
    /// session. Per-file download telemetry goes to `on_progress`.
    ///
    /// Does blocking I/O internally (model download, file reads); runs it
    /// all in `spawn_blocking` to avoid stalling the tokio runtime.
    pub async fn initialize(&self, on_progress: Option<ProgressCallback>) -> Result<()> {
        let (tok, session) = tokio::task::spawn_blocking({
            let config = self.config.clone();
            move || -> Result<(tokenizers::Tokenizer, ort::session::Session)> {
                let (model_path, tokenizer_path) = download_model(&config, on_progress.as_ref())?;

                info!(model = %model_path.display(), "loading ONNX model");

                let tok = tokenizers::Tokenizer::from_file(&tokenizer_path)
                    .map_err(|e| EmbeddingError::ModelInit(format!("tokenizer load: {e}")))?;

                let session = ort::session::Session::builder()
                    .map_err(|e| EmbeddingError::ModelInit(format!("session builder: {e}")))?
                    .with_intra_threads(2)
                    .map_err(|e| EmbeddingError::ModelInit(format!("thread config: {e}")))?
                    .with_log_level(ort::logging::LogLevel::Warning)
                    .map_err(|e| EmbeddingError::ModelInit(format!("log level: {e}")))?
                    .commit_from_file(&model_path)
                    .map_err(|e| EmbeddingError::ModelInit(format!("model load: {e}")))?;

                Ok((tok, session))
            }
        })
        .await
        .map_err(|e| EmbeddingError::Internal(format!("join error: {e}")))??;

        *self.tokenizer.lock() = Some(tok);
        *self.session.lock() = Some(session);
        self.ready.store(true, Ordering::SeqCst);

        info!("ONNX embedding service ready");
        Ok(())
    }

    /// Get the expected model cache path.
    pub fn model_path(&self) -> PathBuf {
        PathBuf::from(self.config.resolved_cache_dir())
    }
}

/// Download model files via `hf-hub`, returning (`model_path`, `tokenizer_path`).
fn download_model(
    config: &EmbeddingConfig,
    on_progress: Option<&ProgressCallback>,
) -> Result<(PathBuf, PathBuf)> {
    let cache_dir = config.resolved_cache_dir();
    debug!(cache_dir, model = %config.model, "downloading model via hf-hub");

    let api = hf_hub::api::sync::ApiBuilder::new()
        .with_cache_dir(PathBuf::from(&cache_dir))
        .build()
        .map_err(|e| EmbeddingError::ModelInit(format!("hf-hub api: {e}")))?;

    let repo = api.model(config.model.clone());

    let fetch = |filename: &str| -> Result<PathBuf> {
        if let Some(cb) = on_progress {
            cb(DownloadProgress {
                file: filename.to_string(),
                progress: 0.0,
            });
        }
        let path = repo
            .get(filename)
            .map_err(|e| EmbeddingError::ModelInit(format!("download ({filename}): {e}")))?;
        if let Some(cb) = on_progress {
            cb(DownloadProgress {
                file: filename.to_string(),
                progress: 1.0,
            });
        }
        Ok(path)
    };

    let model_path = fetch(&config.model_filename())?;
    let tokenizer_path = fetch("tokenizer.json")?;

    info!(model = %model_path.display(), tokenizer = %tokenizer_path.display(), "model files ready");
    Ok((model_path, tokenizer_path))
}

/// Run inference on a batch of texts.
fn run_inference(
    session: &mut ort::session::Session,
    tokenizer: &tokenizers::Tokenizer,
    texts: &[String],
    config: &EmbeddingConfig,
) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| EmbeddingError::Inference(format!("tokenize: {e}")))?;

    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);
    if max_len == 0 {
        return Err(EmbeddingError::Inference("empty tokenization".into()));
    }

    let batch_size = texts.len();

    // Padded input_ids and attention_mask as flat Vec<i64>. XLM-RoBERTa
    // exports take no token_type_ids.
    let mut input_ids = vec![0i64; batch_size * max_len];
    let mut attention_mask = vec![0i64; batch_size * max_len];

    for (i, enc) in encodings.iter().enumerate() {
        let offset = i * max_len;
        for (j, &id) in enc.get_ids().iter().enumerate() {
            input_ids[offset + j] = i64::from(id);
        }
        for (j, &m) in enc.get_attention_mask().iter().enumerate() {
            attention_mask[offset + j] = i64::from(m);
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    let shape = vec![batch_size as i64, max_len as i64];

    let input_ids_tensor = ort::value::Tensor::from_array((shape.clone(), input_ids))
        .map_err(|e| EmbeddingError::Inference(format!("input_ids tensor: {e}")))?;
    let attention_mask_tensor =
        ort::value::Tensor::from_array((shape, attention_mask.clone()))
            .map_err(|e| EmbeddingError::Inference(format!("attention_mask tensor: {e}")))?;

    let outputs = session
        .run(ort::inputs![input_ids_tensor, attention_mask_tensor])
        .map_err(|e| EmbeddingError::Inference(format!("inference: {e}")))?;

    // Output tensor shape: [batch_size, seq_len, hidden_dim]
    let output_value = &outputs[0];
    let (output_shape, output_data) = output_value
        .try_extract_tensor::<f32>()
        .map_err(|e| EmbeddingError::Inference(format!("extract tensor: {e}")))?;

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let dims: Vec<usize> = output_shape.iter().map(|&d| d as usize).collect();
    if dims.len() != 3 || dims[0] != batch_size {
        return Err(EmbeddingError::Inference(format!(
            "unexpected output shape: {output_shape:?}"
        )));
    }
    let seq_len_out = dims[1];
    let hidden_dim = dims[2];
    if hidden_dim != config.dimensions {
        return Err(EmbeddingError::Inference(format!(
            "model produced {hidden_dim}d vectors, config expects {}d",
            config.dimensions
        )));
    }

    // Mean pooling over non-padding tokens, then L2 normalize.
    let mut results = Vec::with_capacity(batch_size);
    for i in 0..batch_size {
        let embedding = mean_pool(output_data, &attention_mask, i, max_len, seq_len_out, hidden_dim);
        results.push(embedding);
    }

    Ok(results)
}

/// Mean of the token vectors with attention, L2-normalized.
fn mean_pool(
    output_data: &[f32],
    attention_mask: &[i64],
    batch_idx: usize,
    mask_len: usize,
    seq_len: usize,
    hidden_dim: usize,
) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden_dim];
    let mut token_count = 0u32;

    let mask_row = &attention_mask[batch_idx * mask_len..(batch_idx + 1) * mask_len];
    for (j, &m) in mask_row.iter().enumerate() {
        if m == 0 || j >= seq_len {
            continue;
        }
        token_count += 1;
        let base = batch_idx * seq_len * hidden_dim + j * hidden_dim;
        for (acc, x) in pooled.iter_mut().zip(&output_data[base..base + hidden_dim]) {
            *acc += x;
        }
    }

    if token_count > 0 {
        #[allow(clippy::cast_precision_loss)]
        let inv = 1.0 / token_count as f32;
        for x in &mut pooled {
            *x *= inv;
        }
    }
    l2_normalize(&mut pooled);
    pooled
}

#[async_trait]
impl EmbeddingService for OnnxEmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if !self.is_ready() {
            return Err(EmbeddingError::NotReady);
        }

        let mut session_guard = self.session.lock();
        let tokenizer_guard = self.tokenizer.lock();

        let session = session_guard.as_mut().ok_or(EmbeddingError::NotReady)?;
        let tokenizer = tokenizer_guard.as_ref().ok_or(EmbeddingError::NotReady)?;

        run_inference(session, tokenizer, texts, &self.config)
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}
