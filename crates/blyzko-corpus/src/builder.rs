//! The corpus build loop.

use indexmap::IndexMap;
use tracing::info;

use blyzko_core::EmbeddingsDatabase;
use blyzko_core::vector::quantize;
use blyzko_embeddings::{EmbeddingService, query_text};

use crate::errors::{BuildError, Result};
use crate::filter::{FilterConfig, filter_vocabulary};

/// How often the build loop logs progress, in words.
const PROGRESS_INTERVAL: usize = 500;

/// Operator-facing summary of a completed build.
#[derive(Clone, Debug)]
pub struct BuildReport {
    /// Raw vocabulary size.
    pub total_input: usize,
    /// Words embedded into the database.
    pub kept: usize,
    /// Words removed by filtering and dedup.
    pub discarded: usize,
}

/// Build an embeddings database from a raw vocabulary.
///
/// Filters the vocabulary, embeds each survivor with the shared
/// `"query: "` convention, quantizes to 4 decimals, and assembles the
/// artifact. Any single embedding failure aborts the build — no partial
/// database is ever produced.
pub async fn build(
    vocabulary: &[String],
    filter: &FilterConfig,
    service: &dyn EmbeddingService,
) -> Result<(EmbeddingsDatabase, BuildReport)> {
    let filtered = filter_vocabulary(vocabulary, filter);
    let total = filtered.kept.len();
    if total == 0 {
        return Err(BuildError::EmptyCorpus);
    }

    info!(
        total,
        discarded = filtered.discarded,
        "vocabulary filtered, embedding corpus"
    );

    let mut entries: IndexMap<String, Vec<f32>> = IndexMap::with_capacity(total);
    for (i, word) in filtered.kept.iter().enumerate() {
        let vector = service
            .embed_single(&query_text(word))
            .await
            .map_err(|source| BuildError::Embed {
                word: word.clone(),
                source,
            })?;
        let _ = entries.insert(word.clone(), quantize(&vector));

        if i % PROGRESS_INTERVAL == 0 {
            let percent = i * 100 / total;
            info!(processed = i, total, percent, "embedding progress");
        }
    }

    let database = EmbeddingsDatabase::from_map(entries)?;
    let report = BuildReport {
        total_input: vocabulary.len(),
        kept: database.len(),
        discarded: vocabulary.len() - database.len(),
    };
    info!(kept = report.kept, discarded = report.discarded, "build complete");

    Ok((database, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use blyzko_core::vector::{QUANT_MAX_ERROR, l2_norm};
    use blyzko_embeddings::MockEmbeddingService;
    use support::FailingService;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| (*w).to_string()).collect()
    }

    fn permissive_filter() -> FilterConfig {
        FilterConfig {
            min_length: 1,
            discard_suffixes: vec![],
            noise_words: std::collections::HashSet::new(),
        }
    }

    #[tokio::test]
    async fn builds_database_for_all_survivors() {
        let svc = MockEmbeddingService::new(8);
        let vocab = words(&["кіт", "пес", "стіл"]);

        let (db, report) = build(&vocab, &permissive_filter(), &svc).await.unwrap();
        assert_eq!(db.len(), 3);
        assert_eq!(db.dimensions(), 8);
        assert_eq!(report.total_input, 3);
        assert_eq!(report.kept, 3);
        assert_eq!(report.discarded, 0);
    }

    #[tokio::test]
    async fn database_keys_are_surface_forms_in_order() {
        let svc = MockEmbeddingService::new(4);
        let vocab = words(&["Зебра", "яблуко"]);

        let (db, _) = build(&vocab, &permissive_filter(), &svc).await.unwrap();
        let keys: Vec<&str> = db.iter().map(|(w, _)| w).collect();
        assert_eq!(keys, vec!["Зебра", "яблуко"]);
    }

    #[tokio::test]
    async fn vectors_are_quantized_near_unit() {
        let svc = MockEmbeddingService::new(64);
        let vocab = words(&["слово"]);

        let (db, _) = build(&vocab, &permissive_filter(), &svc).await.unwrap();
        let stored = db.get("слово").unwrap();

        // Each stored component stays within the documented quantization
        // bound of the service's unit vector, so the norm stays near 1.
        let raw = svc.embed_single(&query_text("слово")).await.unwrap();
        for (s, r) in stored.iter().zip(raw.iter()) {
            assert!((s - r).abs() <= QUANT_MAX_ERROR);
        }
        assert!((l2_norm(stored) - 1.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn filtered_vocabulary_reported() {
        let svc = MockEmbeddingService::new(4);
        let filter = FilterConfig {
            min_length: 3,
            discard_suffixes: vec![],
            noise_words: std::collections::HashSet::new(),
        };
        let vocab = words(&["кіт", "ок", "кіт"]);

        let (db, report) = build(&vocab, &filter, &svc).await.unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(report.total_input, 3);
        assert_eq!(report.discarded, 2);
    }

    #[tokio::test]
    async fn all_filtered_is_empty_corpus_error() {
        let svc = MockEmbeddingService::new(4);
        let filter = FilterConfig {
            min_length: 10,
            discard_suffixes: vec![],
            noise_words: std::collections::HashSet::new(),
        };

        let result = build(&words(&["кіт"]), &filter, &svc).await;
        assert_matches!(result, Err(BuildError::EmptyCorpus));
    }

    #[tokio::test]
    async fn single_failure_aborts_build() {
        let svc = FailingService::after(1);
        let vocab = words(&["перше", "друге", "третє"]);

        let result = build(&vocab, &permissive_filter(), &svc).await;
        assert_matches!(result, Err(BuildError::Embed { ref word, .. }) if word == "друге");
    }

    /// Service that succeeds for N calls, then fails.
    mod support {
        use std::sync::atomic::{AtomicUsize, Ordering};

        use blyzko_embeddings::{EmbeddingError, EmbeddingService};

        pub struct FailingService {
            succeed: usize,
            calls: AtomicUsize,
        }

        impl FailingService {
            pub fn after(succeed: usize) -> Self {
                Self {
                    succeed,
                    calls: AtomicUsize::new(0),
                }
            }
        }

        #[async_trait::async_trait]
        impl EmbeddingService for FailingService {
            async fn embed(
                &self,
                texts: &[String],
            ) -> blyzko_embeddings::Result<Vec<Vec<f32>>> {
                let n = self.calls.fetch_add(1, Ordering::SeqCst);
                if n < self.succeed {
                    Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
                } else {
                    Err(EmbeddingError::Inference("synthetic failure".into()))
                }
            }

            fn is_ready(&self) -> bool {
                true
            }

            fn dimensions(&self) -> usize {
                2
            }
        }
    }
}
