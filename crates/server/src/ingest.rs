//! Corpus ingestion: FAQ CSV loading and snapshot rebuilds.
//!
//! The FAQ format is semicolon-delimited `question;answer` rows. Question and
//! answer are joined into one searchable passage so both halves contribute to
//! retrieval. Rebuilds run the full pipeline (load, optionally embed, index)
//! and atomically install the result into the shared handle.

use crate::embedding::{Embedder, EmbeddingError};
use crate::store::{SqliteStore, StoreError};
use ragserve_core::{Bm25Config, Corpus, CorpusHandle, DistanceMetric, RetrievalError};
use std::fs;
use std::path::Path;
use thiserror::Error;

const CSV_DELIMITER: char = ';';

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read corpus file: {0}")]
    Io(#[from] std::io::Error),
    #[error("corpus file contained no usable rows")]
    Empty,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("embedding during ingest failed: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("index build failed: {0}")]
    Build(#[from] RetrievalError),
}

/// Parses a semicolon-delimited FAQ file into passages.
///
/// Each row's first two fields are joined with a single space; rows with
/// fewer than two fields are skipped with a warning rather than aborting the
/// whole load. Returns an error only if nothing usable remains.
pub fn load_faq_csv(path: &Path, has_header: bool) -> Result<Vec<String>, IngestError> {
    let raw = fs::read_to_string(path)?;
    let mut passages = Vec::new();
    let skip = usize::from(has_header);
    for (line_no, line) in raw.lines().enumerate().skip(skip) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, CSV_DELIMITER);
        match (fields.next(), fields.next()) {
            (Some(question), Some(answer)) if !question.trim().is_empty() => {
                passages.push(format!("{} {}", question.trim(), answer.trim()));
            }
            _ => {
                tracing::warn!(line = line_no + 1, "skipping malformed FAQ row");
            }
        }
    }
    if passages.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(passages)
}

/// Rebuilds the corpus snapshot from the document store and installs it.
///
/// With an embedder present every document is embedded and the snapshot
/// supports dense and hybrid retrieval; without one the snapshot is
/// sparse-only. A failed build is installed too, so readers see the build
/// error instead of a stale snapshot. Returns the number of indexed
/// documents.
pub async fn rebuild_corpus(
    store: &SqliteStore,
    handle: &CorpusHandle,
    embedder: Option<&dyn Embedder>,
    bm25: Bm25Config,
    metric: DistanceMetric,
) -> Result<usize, IngestError> {
    let documents = store.load_documents()?;
    let count = documents.len();

    let embeddings = match embedder {
        Some(embedder) if count > 0 => {
            let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
            Some(embedder.embed_batch(&texts).await?)
        }
        _ => None,
    };

    let built = Corpus::build(documents, embeddings, bm25, metric);
    let build_error = built.as_ref().err().cloned();
    handle.install(built);
    if let Some(err) = build_error {
        return Err(IngestError::Build(err));
    }

    tracing::info!(documents = count, "installed corpus snapshot");
    Ok(count)
}

/// Startup ingestion: optionally replace the stored corpus from a FAQ file,
/// then build the first snapshot from whatever the store holds.
pub async fn bootstrap(
    store: &SqliteStore,
    handle: &CorpusHandle,
    embedder: Option<&dyn Embedder>,
    faq_csv: Option<&Path>,
    csv_has_header: bool,
    bm25: Bm25Config,
    metric: DistanceMetric,
) -> Result<usize, IngestError> {
    if let Some(path) = faq_csv {
        let passages = load_faq_csv(path, csv_has_header)?;
        let ids = store.replace_documents(&passages)?;
        tracing::info!(path = %path.display(), documents = ids.len(), "loaded FAQ corpus");
    }
    rebuild_corpus(store, handle, embedder, bm25, metric).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriever::tests::FakeEmbedder;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_faq_joins_question_and_answer() {
        let file = write_csv("How do I reset?;Use the settings page.\nRefunds?;Within 30 days.\n");
        let passages = load_faq_csv(file.path(), false).unwrap();
        assert_eq!(
            passages,
            vec![
                "How do I reset? Use the settings page.",
                "Refunds? Within 30 days.",
            ]
        );
    }

    #[test]
    fn test_load_faq_skips_header_and_malformed_rows() {
        let file = write_csv("question;answer\nonly one field\nValid?;Yes.\n\n;empty question\n");
        let passages = load_faq_csv(file.path(), true).unwrap();
        assert_eq!(passages, vec!["Valid? Yes."]);
    }

    #[test]
    fn test_load_faq_extra_fields_fold_into_answer() {
        // Only the first two fields matter; anything after a second
        // delimiter stays inside the answer text.
        let file = write_csv("Q;first part;second part\n");
        let passages = load_faq_csv(file.path(), false).unwrap();
        assert_eq!(passages, vec!["Q first part;second part"]);
    }

    #[test]
    fn test_load_faq_empty_file_is_an_error() {
        let file = write_csv("question;answer\n");
        assert!(matches!(
            load_faq_csv(file.path(), true),
            Err(IngestError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_builds_sparse_snapshot() {
        let file = write_csv("Reset?;Settings page.\nRefund?;Thirty days.\n");
        let store = SqliteStore::open_in_memory().unwrap();
        let handle = CorpusHandle::new();

        let count = bootstrap(
            &store,
            &handle,
            None,
            Some(file.path()),
            false,
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .await
        .unwrap();

        assert_eq!(count, 2);
        let corpus = handle.current().unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(!corpus.has_vectors());
    }

    #[tokio::test]
    async fn test_rebuild_with_embedder_enables_dense() {
        let file = write_csv("Reset?;Settings page.\n");
        let store = SqliteStore::open_in_memory().unwrap();
        let handle = CorpusHandle::new();
        let embedder = FakeEmbedder { dimension: 8 };

        bootstrap(
            &store,
            &handle,
            Some(&embedder),
            Some(file.path()),
            false,
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .await
        .unwrap();

        assert!(handle.current().unwrap().has_vectors());
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_snapshot() {
        let store = SqliteStore::open_in_memory().unwrap();
        let handle = CorpusHandle::new();
        store
            .replace_documents(&["first corpus".to_string()])
            .unwrap();
        rebuild_corpus(
            &store,
            &handle,
            None,
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .await
        .unwrap();

        store
            .replace_documents(&["second corpus".to_string(), "more text".to_string()])
            .unwrap();
        let count = rebuild_corpus(
            &store,
            &handle,
            None,
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .await
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(handle.corpus_size(), 2);
    }
}
