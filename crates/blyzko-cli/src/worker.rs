//! The `worker` subcommand — the engine behind the game protocol.
//!
//! Reads one JSON command per stdin line, writes one JSON event per stdout
//! line. Logs go to stderr so the protocol stream stays clean.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use blyzko_embeddings::{EmbeddingConfig, ProgressCallback};
use blyzko_engine::{Command, Engine, EngineError, EngineLoader, EngineWorker, Event};
use blyzko_settings::BlyzkoSettings;

use crate::WorkerArgs;

/// Loads the ONNX service and the database file, once, on first command.
#[cfg_attr(not(feature = "ort"), allow(dead_code))]
struct CliEngineLoader {
    database_path: PathBuf,
    config: EmbeddingConfig,
    top_k: usize,
}

#[async_trait]
impl EngineLoader for CliEngineLoader {
    async fn load(&self, on_progress: ProgressCallback) -> blyzko_engine::Result<Engine> {
        #[cfg(feature = "ort")]
        {
            use blyzko_core::EmbeddingsDatabase;
            use blyzko_embeddings::ort_service::OnnxEmbeddingService;

            let path = self.database_path.clone();
            let database = tokio::task::spawn_blocking(move || EmbeddingsDatabase::load(&path))
                .await
                .map_err(|e| EngineError::Internal(format!("load task failed: {e}")))?
                .map_err(|e| EngineError::Load(format!("embeddings database: {e}")))?;

            let service = OnnxEmbeddingService::new(self.config.clone());
            service
                .initialize(Some(on_progress))
                .await
                .map_err(|e| EngineError::Load(e.to_string()))?;

            Ok(Engine::new(Arc::new(service), Arc::new(database)).with_top_k(self.top_k))
        }
        #[cfg(not(feature = "ort"))]
        {
            let _ = on_progress;
            Err(EngineError::Load(
                "built without the ONNX backend; recompile with `--features ort`".into(),
            ))
        }
    }
}

/// Run the stdin/stdout protocol loop until EOF.
pub async fn run(args: WorkerArgs, settings: &BlyzkoSettings) -> Result<()> {
    let loader = Arc::new(CliEngineLoader {
        database_path: args.database,
        config: EmbeddingConfig::from_settings(&settings.embedding),
        top_k: settings.engine.top_k,
    });

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let malformed_tx = events_tx.clone();
    let worker = EngineWorker::spawn(loader, events_tx);

    // Events → stdout, one JSON object per line.
    let printer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = events_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(mut line) => {
                    line.push('\n');
                    if stdout.write_all(line.as_bytes()).await.is_err() {
                        break;
                    }
                    let _ = stdout.flush().await;
                }
                Err(e) => warn!(error = %e, "event serialization failed"),
            }
        }
    });

    // stdin lines → commands. A malformed line produces an error event and
    // is skipped; it never kills the worker.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("stdin read failed")? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Command>(trimmed) {
            Ok(command) => {
                if !worker.send(command) {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "malformed command line");
                let _ = malformed_tx.send(Event::Error {
                    message: format!("malformed command: {e}"),
                });
            }
        }
    }

    drop(malformed_tx);
    worker.shutdown().await;
    printer.await.context("stdout task failed")?;
    Ok(())
}
