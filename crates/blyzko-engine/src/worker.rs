//! The FIFO command worker.
//!
//! Commands are serialized through an MPSC channel to a single consumer
//! task: one command is fully processed before the next is dequeued. That
//! ordering is the concurrency contract — a `start` arriving while a
//! previous `start` is still ranking waits its turn, and a `guess` can
//! never observe a half-built rank table. There is no cancellation; an
//! in-flight `start` always runs to completion.
//!
//! Loading is lazy: the first command triggers [`EngineLoader::load`],
//! which runs exactly once per worker and emits `ready` (plus any
//! `download_progress` telemetry). A load failure is reported as an
//! `error` event and consumed with the triggering command; the next
//! command retries the load.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use blyzko_core::normalize_word;
use blyzko_embeddings::{DownloadProgress, ProgressCallback};

use crate::engine::Engine;
use crate::errors::Result;
use crate::protocol::{Command, Event};
use crate::session::Session;

/// Loads the embedding service and database once per process.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    /// Produce a ready [`Engine`]; download telemetry goes to `on_progress`.
    async fn load(&self, on_progress: ProgressCallback) -> Result<Engine>;
}

/// Handle to a spawned engine worker.
pub struct EngineWorker {
    tx: mpsc::UnboundedSender<Command>,
    handle: tokio::task::JoinHandle<()>,
}

impl EngineWorker {
    /// Spawn the worker task. Events are delivered on `events` in the
    /// order they are produced.
    pub fn spawn(loader: Arc<dyn EngineLoader>, events: mpsc::UnboundedSender<Event>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(loader, rx, events));
        Self { tx, handle }
    }

    /// Enqueue a command (FIFO). Returns `false` if the worker has exited.
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }

    /// Close the queue and wait for all queued commands to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.handle.await;
    }
}

async fn run(
    loader: Arc<dyn EngineLoader>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<Event>,
) {
    let mut engine: Option<Engine> = None;
    let mut session: Option<Session> = None;

    while let Some(command) = rx.recv().await {
        let Some(engine_ref) = ensure_loaded(&*loader, &mut engine, &events).await else {
            continue;
        };

        match command {
            Command::Start { target } => match engine_ref.start_session(&target).await {
                Ok(new_session) => {
                    info!(
                        vocabulary = new_session.vocabulary_size(),
                        "session started"
                    );
                    let top500 = new_session.top_entries().to_vec();
                    session = Some(new_session);
                    let _ = events.send(Event::InitDone { top500 });
                }
                Err(e) => {
                    warn!(error = %e, "start failed");
                    let _ = events.send(Event::Error {
                        message: e.to_string(),
                    });
                }
            },
            Command::Guess { target, guess } => {
                if let Some(live) = &session {
                    if normalize_word(&target) != live.target() {
                        warn!(supplied = %target, "guess target differs from live session");
                    }
                    let rank = live.resolve_guess(&guess);
                    let _ = events.send(Event::Result { word: guess, rank });
                } else {
                    let _ = events.send(Event::Error {
                        message: "no active session; send start first".into(),
                    });
                }
            }
        }
    }
}

/// Load the engine on first use; on failure report and leave it unloaded
/// so the next command retries.
async fn ensure_loaded<'a>(
    loader: &dyn EngineLoader,
    engine: &'a mut Option<Engine>,
    events: &mpsc::UnboundedSender<Event>,
) -> Option<&'a Engine> {
    if engine.is_none() {
        let progress_events = events.clone();
        let on_progress: ProgressCallback = Arc::new(move |p: DownloadProgress| {
            let _ = progress_events.send(Event::DownloadProgress {
                progress: p.progress,
                file: p.file,
            });
        });

        match loader.load(on_progress).await {
            Ok(loaded) => {
                info!("engine loaded");
                *engine = Some(loaded);
                let _ = events.send(Event::Ready);
            }
            Err(e) => {
                warn!(error = %e, "engine load failed");
                let _ = events.send(Event::Error {
                    message: e.to_string(),
                });
                return None;
            }
        }
    }
    engine.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use indexmap::IndexMap;

    use blyzko_core::EmbeddingsDatabase;
    use blyzko_embeddings::MockEmbeddingService;

    use crate::errors::EngineError;
    use crate::protocol::TopEntry;

    fn fixture_engine() -> Engine {
        let entries: IndexMap<String, Vec<f32>> = [
            ("cat".to_string(), vec![1.0, 0.0]),
            ("dog".to_string(), vec![0.9, 0.436]),
            ("table".to_string(), vec![0.0, 1.0]),
        ]
        .into_iter()
        .collect();
        let db = Arc::new(EmbeddingsDatabase::from_map(entries).unwrap());

        let svc = MockEmbeddingService::new(2);
        svc.pin("query: cat", vec![1.0, 0.0]);
        svc.pin("query: table", vec![0.0, 1.0]);
        Engine::new(Arc::new(svc), db)
    }

    struct FixtureLoader;

    #[async_trait]
    impl EngineLoader for FixtureLoader {
        async fn load(&self, on_progress: ProgressCallback) -> Result<Engine> {
            on_progress(DownloadProgress {
                file: "onnx/model_quantized.onnx".into(),
                progress: 1.0,
            });
            Ok(fixture_engine())
        }
    }

    /// Fails the first `failures` loads, then succeeds.
    struct FlakyLoader {
        failures: usize,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl EngineLoader for FlakyLoader {
        async fn load(&self, _on_progress: ProgressCallback) -> Result<Engine> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(EngineError::Load("database unreadable".into()))
            } else {
                Ok(fixture_engine())
            }
        }
    }

    fn spawn_fixture() -> (EngineWorker, mpsc::UnboundedReceiver<Event>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let worker = EngineWorker::spawn(Arc::new(FixtureLoader), events_tx);
        (worker, events_rx)
    }

    fn start(target: &str) -> Command {
        Command::Start {
            target: target.into(),
        }
    }

    fn guess(target: &str, guess: &str) -> Command {
        Command::Guess {
            target: target.into(),
            guess: guess.into(),
        }
    }

    #[tokio::test]
    async fn first_command_triggers_load_and_ready() {
        let (worker, mut events) = spawn_fixture();
        assert!(worker.send(start("cat")));

        assert!(matches!(
            events.recv().await.unwrap(),
            Event::DownloadProgress { .. }
        ));
        assert_eq!(events.recv().await.unwrap(), Event::Ready);
        assert!(matches!(events.recv().await.unwrap(), Event::InitDone { .. }));
        worker.shutdown().await;
    }

    #[tokio::test]
    async fn guess_resolves_against_live_session() {
        let (worker, mut events) = spawn_fixture();
        let _ = worker.send(start("cat"));
        let _ = worker.send(guess("cat", "dog"));
        let _ = worker.send(guess("cat", "chair"));
        worker.shutdown().await;

        let mut results = Vec::new();
        while let Some(event) = events.recv().await {
            if let Event::Result { word, rank } = event {
                results.push((word, rank));
            }
        }
        assert_eq!(
            results,
            vec![
                ("dog".to_string(), Some(2)),
                ("chair".to_string(), None),
            ]
        );
    }

    #[tokio::test]
    async fn guess_without_session_is_error() {
        let (worker, mut events) = spawn_fixture();
        let _ = worker.send(guess("cat", "dog"));
        worker.shutdown().await;

        assert_eq!(events.recv().await.unwrap(), Event::Ready);
        assert!(matches!(events.recv().await.unwrap(), Event::Error { .. }));
    }

    #[tokio::test]
    async fn commands_processed_in_fifo_order() {
        let (worker, mut events) = spawn_fixture();
        // Queue everything up front; the second start must not interleave
        // with the first session's guess.
        let _ = worker.send(start("cat"));
        let _ = worker.send(guess("cat", "dog"));
        let _ = worker.send(start("table"));
        let _ = worker.send(guess("table", "cat"));
        worker.shutdown().await;

        let mut seen = Vec::new();
        while let Some(event) = events.recv().await {
            match event {
                Event::InitDone { top500 } => {
                    seen.push(format!("init:{}", top500[0].word));
                }
                Event::Result { word, rank } => {
                    seen.push(format!("result:{word}:{rank:?}"));
                }
                _ => {}
            }
        }
        assert_eq!(
            seen,
            vec![
                "init:cat",
                "result:dog:Some(2)",
                "init:table",
                // against the "table" session, cat is orthogonal → rank 3
                "result:cat:Some(3)",
            ]
        );
    }

    #[tokio::test]
    async fn load_failure_is_retriable() {
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let loader = Arc::new(FlakyLoader {
            failures: 1,
            attempts: AtomicUsize::new(0),
        });
        let worker = EngineWorker::spawn(loader, events_tx);

        let _ = worker.send(start("cat"));
        assert!(matches!(events.recv().await.unwrap(), Event::Error { .. }));

        // Retry: load succeeds this time
        let _ = worker.send(start("cat"));
        assert_eq!(events.recv().await.unwrap(), Event::Ready);
        assert!(matches!(events.recv().await.unwrap(), Event::InitDone { .. }));
        worker.shutdown().await;
    }

    #[tokio::test]
    async fn loader_runs_once_for_many_commands() {
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let loader = Arc::new(FlakyLoader {
            failures: 0,
            attempts: AtomicUsize::new(0),
        });
        let worker = EngineWorker::spawn(Arc::clone(&loader) as Arc<dyn EngineLoader>, events_tx);

        let _ = worker.send(start("cat"));
        let _ = worker.send(start("table"));
        let _ = worker.send(guess("table", "dog"));
        worker.shutdown().await;

        assert_eq!(loader.attempts.load(Ordering::SeqCst), 1);
        let mut ready_count = 0;
        while let Some(event) = events.recv().await {
            if event == Event::Ready {
                ready_count += 1;
            }
        }
        assert_eq!(ready_count, 1);
    }

    #[tokio::test]
    async fn new_start_replaces_session_snapshot() {
        let (worker, mut events) = spawn_fixture();
        let _ = worker.send(start("cat"));
        let _ = worker.send(start("table"));
        worker.shutdown().await;

        let mut snapshots: Vec<Vec<TopEntry>> = Vec::new();
        while let Some(event) = events.recv().await {
            if let Event::InitDone { top500 } = event {
                snapshots.push(top500);
            }
        }
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0][0].word, "cat");
        assert_eq!(snapshots[1][0].word, "table");
    }

    #[tokio::test]
    async fn send_after_shutdown_fails() {
        let (worker, _events) = spawn_fixture();
        let tx = worker.tx.clone();
        worker.shutdown().await;
        assert!(tx.send(start("cat")).is_err());
    }
}
