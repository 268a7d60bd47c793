//! The `build` subcommand — offline corpus build.

use anyhow::Result;

use blyzko_settings::BlyzkoSettings;

use crate::BuildArgs;

/// Build the embeddings database from the vocabulary file.
#[cfg(feature = "ort")]
pub async fn run(args: &BuildArgs, settings: &BlyzkoSettings) -> Result<()> {
    use anyhow::Context;
    use tracing::info;

    use blyzko_core::vocabulary::load_vocabulary;
    use blyzko_corpus::{FilterConfig, build};
    use blyzko_embeddings::ort_service::OnnxEmbeddingService;
    use blyzko_embeddings::{EmbeddingConfig, ProgressCallback};

    let vocabulary = load_vocabulary(&args.dictionary).with_context(|| {
        format!("failed to read vocabulary {}", args.dictionary.display())
    })?;
    info!(words = vocabulary.len(), "vocabulary loaded");

    let config = EmbeddingConfig::from_settings(&settings.embedding);
    let service = OnnxEmbeddingService::new(config);
    let progress: ProgressCallback = std::sync::Arc::new(|p| {
        tracing::info!(file = %p.file, progress = p.progress, "model download");
    });
    service
        .initialize(Some(progress))
        .await
        .context("embedding model initialization failed")?;

    let filter = FilterConfig::from_settings(&settings.filter);
    let (database, report) = build(&vocabulary, &filter, &service).await?;

    let bytes = database.save(&args.output)?;
    #[allow(clippy::cast_precision_loss)]
    let size_mb = bytes as f64 / (1024.0 * 1024.0);
    info!(
        path = %args.output.display(),
        kept = report.kept,
        discarded = report.discarded,
        size_mb = format!("{size_mb:.2}"),
        "embeddings database written"
    );
    Ok(())
}

/// Without the ONNX backend there is nothing to embed with.
#[cfg(not(feature = "ort"))]
pub async fn run(_args: &BuildArgs, _settings: &BlyzkoSettings) -> Result<()> {
    anyhow::bail!("`blyzko build` needs the ONNX backend; recompile with `--features ort`")
}
