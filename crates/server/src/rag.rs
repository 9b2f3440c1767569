//! RAG orchestration: retrieve → generate → persist.
//!
//! The three steps are sequential because each depends on the prior step's
//! output. Retrieval and generation failures surface as distinct error
//! categories; history persistence is fire-and-forget relative to the
//! returned answer.

use crate::generation::{GenerationError, Generator};
use crate::retriever::{RetrieveError, Retriever};
use crate::store::History;
use chrono::Utc;
use ragserve_core::{CorpusHandle, DocId};
use std::sync::Arc;
use thiserror::Error;

/// Why a question could not be answered. The boundary layer responds
/// differently to each category: retrieval failures are availability or
/// validation problems, generation failures are upstream dependency
/// problems.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrieveError),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// A grounded answer with the documents it drew from.
#[derive(Debug)]
pub struct RagAnswer {
    pub answer: String,
    /// `(document id, retrieval score)` in rank order.
    pub sources: Vec<(DocId, f32)>,
}

/// Sequences retrieval, generation, and history persistence for one request.
pub struct RagService {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn Generator>,
    history: Arc<dyn History>,
    handle: Arc<CorpusHandle>,
}

impl RagService {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn Generator>,
        history: Arc<dyn History>,
        handle: Arc<CorpusHandle>,
    ) -> Self {
        Self {
            retriever,
            generator,
            history,
            handle,
        }
    }

    /// Answers a question grounded in the current corpus snapshot.
    ///
    /// `k` is clamped into `[1, corpus_size]`; a request is never rejected
    /// solely for asking for more documents than exist. Zero retrieved
    /// documents still go to generation with empty context, so the model can
    /// reply "no relevant information" instead of the caller seeing a hard
    /// error. A history write failure is logged and swallowed: the answer
    /// already exists and is returned regardless.
    pub async fn ask(&self, question: &str, k: usize) -> Result<RagAnswer, AskError> {
        let corpus_size = self.handle.corpus_size();
        let k = if corpus_size > 0 {
            k.clamp(1, corpus_size)
        } else {
            k.max(1)
        };

        let results = self.retriever.retrieve(question, k).await?;
        tracing::debug!(count = results.len(), k, "retrieved context documents");

        let documents: Vec<_> = results.iter().map(|r| Arc::clone(&r.document)).collect();
        let answer = self.generator.generate(question, &documents).await?;

        let sources: Vec<(DocId, f32)> = results
            .iter()
            .map(|r| (r.document.id, r.score))
            .collect();
        let source_ids: Vec<DocId> = sources.iter().map(|&(id, _)| id).collect();

        if let Err(err) = self
            .history
            .record(question, &answer, &source_ids, Utc::now())
            .await
        {
            tracing::warn!(error = %err, "failed to record QA history");
        }

        Ok(RagAnswer { answer, sources })
    }
}
