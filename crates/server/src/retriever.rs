//! Retrieval capability and the three strategies that satisfy it.
//!
//! Strategy selection happens once, at construction, from configuration; the
//! orchestrator only ever sees the [`Retriever`] trait. Every strategy
//! answers against the snapshot current at call time and never mutates it,
//! so concurrent retrievals need no locking.

use crate::embedding::{Embedder, EmbeddingError};
use async_trait::async_trait;
use clap::ValueEnum;
use ragserve_core::{CorpusHandle, FusionConfig, RetrievalError, ScoredDocument};
use std::sync::Arc;
use thiserror::Error;

/// A retrieval failure: either from the index itself or from the embedding
/// backend a dense strategy depends on.
#[derive(Debug, Error)]
pub enum RetrieveError {
    #[error(transparent)]
    Index(#[from] RetrievalError),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

/// The capability contract all strategies satisfy.
///
/// `retrieve` returns at most `k` documents sorted by descending score, ties
/// broken by ascending document id. Fails with `InvalidArgument` when
/// `k < 1`; an empty corpus yields an empty sequence.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize)
        -> Result<Vec<ScoredDocument>, RetrieveError>;
}

/// Which strategy serves queries, chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RetrievalMode {
    Sparse,
    Dense,
    Hybrid,
}

fn validate_k(k: usize) -> Result<(), RetrieveError> {
    if k < 1 {
        return Err(RetrievalError::InvalidArgument("k must be >= 1".into()).into());
    }
    Ok(())
}

/// Lexical ranking via BM25 over the tokenized corpus.
pub struct SparseRetriever {
    handle: Arc<CorpusHandle>,
}

impl SparseRetriever {
    pub fn new(handle: Arc<CorpusHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl Retriever for SparseRetriever {
    async fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, RetrieveError> {
        validate_k(k)?;
        let corpus = self.handle.current()?;
        Ok(corpus.sparse_search(query, k))
    }
}

/// Similarity ranking via per-document vectors and a query vector obtained
/// from the embedding capability.
pub struct DenseRetriever {
    handle: Arc<CorpusHandle>,
    embedder: Arc<dyn Embedder>,
}

impl DenseRetriever {
    pub fn new(handle: Arc<CorpusHandle>, embedder: Arc<dyn Embedder>) -> Self {
        Self { handle, embedder }
    }
}

#[async_trait]
impl Retriever for DenseRetriever {
    async fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, RetrieveError> {
        validate_k(k)?;
        let corpus = self.handle.current()?;
        if corpus.is_empty() {
            return Ok(Vec::new());
        }
        let query_vector = self.embedder.embed(query).await?;
        Ok(corpus.dense_search(&query_vector, k)?)
    }
}

/// Composition of sparse and dense with score fusion.
pub struct HybridRetriever {
    handle: Arc<CorpusHandle>,
    embedder: Arc<dyn Embedder>,
    fusion: FusionConfig,
}

impl HybridRetriever {
    pub fn new(handle: Arc<CorpusHandle>, embedder: Arc<dyn Embedder>, fusion: FusionConfig) -> Self {
        Self {
            handle,
            embedder,
            fusion,
        }
    }
}

#[async_trait]
impl Retriever for HybridRetriever {
    async fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, RetrieveError> {
        validate_k(k)?;
        let corpus = self.handle.current()?;
        if corpus.is_empty() {
            return Ok(Vec::new());
        }
        let query_vector = self.embedder.embed(query).await?;
        Ok(corpus.hybrid_search(query, &query_vector, k, &self.fusion)?)
    }
}

/// Selects the strategy from configuration.
///
/// Dense and hybrid modes require an embedder; `None` for those modes is a
/// startup configuration error surfaced here rather than at query time.
pub fn build_retriever(
    mode: RetrievalMode,
    handle: Arc<CorpusHandle>,
    embedder: Option<Arc<dyn Embedder>>,
    fusion: FusionConfig,
) -> Result<Arc<dyn Retriever>, RetrievalError> {
    match mode {
        RetrievalMode::Sparse => Ok(Arc::new(SparseRetriever::new(handle))),
        RetrievalMode::Dense => {
            let embedder = embedder.ok_or_else(|| {
                RetrievalError::InvalidArgument("dense mode requires an embedding backend".into())
            })?;
            Ok(Arc::new(DenseRetriever::new(handle, embedder)))
        }
        RetrievalMode::Hybrid => {
            let embedder = embedder.ok_or_else(|| {
                RetrievalError::InvalidArgument("hybrid mode requires an embedding backend".into())
            })?;
            Ok(Arc::new(HybridRetriever::new(handle, embedder, fusion)))
        }
    }
}
