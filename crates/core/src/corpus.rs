//! Corpus snapshot: documents plus derived retrieval structures.
//!
//! A [`Corpus`] is the immutable unit a retriever answers against: the
//! ordered document set, its BM25 inverted index, and (when embeddings are
//! supplied) a flat vector index. Built wholesale; never mutated afterwards,
//! so `&self` queries are safe under concurrent invocation with no locking.

use crate::bm25::{bm25_search, InvertedIndex};
use crate::config::{Bm25Config, FusionConfig};
use crate::document::{DocId, Document};
use crate::error::RetrievalError;
use crate::search::fusion::fuse;
use crate::search::ScoredDocument;
use crate::vector::{DistanceMetric, VectorIndex};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable document set with precomputed retrieval statistics.
///
/// Internal u32 ids are assigned in ascending external-id order, so a
/// tie-break on internal ids is exactly a tie-break on document ids.
#[derive(Debug)]
pub struct Corpus {
    /// internal_id → document.
    documents: Vec<Arc<Document>>,
    /// external id → internal id.
    by_id: HashMap<DocId, u32>,
    bm25_index: InvertedIndex,
    vector_index: Option<VectorIndex>,
    bm25_config: Bm25Config,
}

impl Corpus {
    /// Builds a snapshot from documents and optional parallel embeddings.
    ///
    /// `embeddings[i]` must correspond to `documents[i]`. Fails with
    /// `InvalidArgument` on duplicate document ids or a length mismatch
    /// between the two slices, and propagates `DimensionMismatch` from
    /// vector-index construction.
    pub fn build(
        documents: Vec<Document>,
        embeddings: Option<Vec<Vec<f32>>>,
        bm25_config: Bm25Config,
        metric: DistanceMetric,
    ) -> Result<Self, RetrievalError> {
        if let Some(ref embs) = embeddings {
            if embs.len() != documents.len() {
                return Err(RetrievalError::InvalidArgument(format!(
                    "{} embeddings for {} documents",
                    embs.len(),
                    documents.len()
                )));
            }
        }

        // Order by ascending external id so internal-id tie-breaks equal
        // document-id tie-breaks regardless of input order.
        let mut pairs: Vec<(Document, Option<Vec<f32>>)> = match embeddings {
            Some(embs) => documents
                .into_iter()
                .zip(embs.into_iter().map(Some))
                .collect(),
            None => documents.into_iter().map(|d| (d, None)).collect(),
        };
        pairs.sort_by_key(|(d, _)| d.id);

        let mut docs = Vec::with_capacity(pairs.len());
        let mut by_id = HashMap::with_capacity(pairs.len());
        let mut bm25_index = InvertedIndex::new();
        let mut vectors = Vec::new();
        let has_vectors = pairs.first().map(|(_, e)| e.is_some()).unwrap_or(false);

        for (internal_id, (doc, embedding)) in pairs.into_iter().enumerate() {
            if by_id.insert(doc.id, internal_id as u32).is_some() {
                return Err(RetrievalError::InvalidArgument(format!(
                    "duplicate document id {}",
                    doc.id
                )));
            }
            bm25_index.add_document(internal_id as u32, &doc.text);
            if let Some(e) = embedding {
                vectors.push(e);
            }
            docs.push(Arc::new(doc));
        }

        let vector_index = if has_vectors {
            Some(VectorIndex::build(vectors, metric)?)
        } else {
            None
        };

        Ok(Self {
            documents: docs,
            by_id,
            bm25_index,
            vector_index,
            bm25_config,
        })
    }

    /// Number of documents in the snapshot.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the snapshot holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns `true` if a vector index was built for this snapshot.
    pub fn has_vectors(&self) -> bool {
        self.vector_index.is_some()
    }

    /// Looks up a document by external id.
    pub fn document(&self, id: DocId) -> Option<Arc<Document>> {
        self.by_id
            .get(&id)
            .map(|&i| Arc::clone(&self.documents[i as usize]))
    }

    /// All documents in ascending id order.
    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    /// BM25 lexical ranking.
    ///
    /// Documents with zero query-term overlap are excluded; an empty query
    /// yields an empty result.
    pub fn sparse_search(&self, query: &str, k: usize) -> Vec<ScoredDocument> {
        self.resolve(bm25_search(&self.bm25_index, query, k, self.bm25_config))
    }

    /// Exact vector-similarity ranking against a precomputed query vector.
    ///
    /// Fails with `NotReady` when the snapshot was built without embeddings.
    pub fn dense_search(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>, RetrievalError> {
        let index = self.vector_index.as_ref().ok_or(RetrievalError::NotReady)?;
        Ok(self.resolve(index.search(query_vector, k)?))
    }

    /// Hybrid ranking: over-fetched sparse and dense candidates fused per
    /// `fusion`, truncated to `k`.
    pub fn hybrid_search(
        &self,
        query: &str,
        query_vector: &[f32],
        k: usize,
        fusion: &FusionConfig,
    ) -> Result<Vec<ScoredDocument>, RetrievalError> {
        let index = self.vector_index.as_ref().ok_or(RetrievalError::NotReady)?;
        let fetch = k.saturating_mul(fusion.overfetch_multiplier.max(1));

        let sparse = bm25_search(&self.bm25_index, query, fetch, self.bm25_config);
        let dense = index.search(query_vector, fetch)?;

        Ok(self.resolve(fuse(&sparse, &dense, fusion, k)))
    }

    fn resolve(&self, scored: Vec<(u32, f32)>) -> Vec<ScoredDocument> {
        scored
            .into_iter()
            .map(|(internal_id, score)| ScoredDocument {
                document: Arc::clone(&self.documents[internal_id as usize]),
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq_docs() -> Vec<Document> {
        vec![
            Document::new(1, "How do I get a refund for my order"),
            Document::new(2, "Shipping times and delivery tracking"),
            Document::new(3, "How to reset your account password"),
        ]
    }

    fn unit_embeddings() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn test_build_rejects_duplicate_ids() {
        let docs = vec![Document::new(1, "a"), Document::new(1, "b")];
        let err = Corpus::build(docs, None, Bm25Config::default(), DistanceMetric::default())
            .unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidArgument(_)));
    }

    #[test]
    fn test_build_rejects_embedding_count_mismatch() {
        let err = Corpus::build(
            faq_docs(),
            Some(vec![vec![1.0, 0.0]]),
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidArgument(_)));
    }

    #[test]
    fn test_build_propagates_dimension_mismatch() {
        let mut embs = unit_embeddings();
        embs[2] = vec![1.0, 0.0];
        let err = Corpus::build(
            faq_docs(),
            Some(embs),
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RetrievalError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_sparse_search_finds_password_doc_only() {
        let corpus = Corpus::build(
            faq_docs(),
            None,
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .unwrap();
        let results = corpus.sparse_search("password", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, 3);
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn test_dense_search_without_vectors_is_not_ready() {
        let corpus = Corpus::build(
            faq_docs(),
            None,
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .unwrap();
        assert_eq!(
            corpus.dense_search(&[1.0, 0.0, 0.0], 1).unwrap_err(),
            RetrievalError::NotReady
        );
    }

    #[test]
    fn test_dense_search_orders_by_similarity() {
        let corpus = Corpus::build(
            faq_docs(),
            Some(unit_embeddings()),
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .unwrap();
        let results = corpus.dense_search(&[0.1, 0.0, 0.9], 2).unwrap();
        assert_eq!(results[0].document.id, 3);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_tie_break_uses_document_id_not_insertion_order() {
        // Same two identical documents inserted in both orders; ordering of
        // results must be identical.
        let forward = vec![Document::new(1, "reset password"), Document::new(2, "reset password")];
        let backward = vec![Document::new(2, "reset password"), Document::new(1, "reset password")];
        let c1 = Corpus::build(forward, None, Bm25Config::default(), DistanceMetric::default())
            .unwrap();
        let c2 = Corpus::build(backward, None, Bm25Config::default(), DistanceMetric::default())
            .unwrap();
        let ids1: Vec<DocId> = c1.sparse_search("password", 2).iter().map(|r| r.document.id).collect();
        let ids2: Vec<DocId> = c2.sparse_search("password", 2).iter().map(|r| r.document.id).collect();
        assert_eq!(ids1, vec![1, 2]);
        assert_eq!(ids1, ids2);
    }

    #[test]
    fn test_hybrid_search_returns_at_most_k() {
        let corpus = Corpus::build(
            faq_docs(),
            Some(unit_embeddings()),
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .unwrap();
        let results = corpus
            .hybrid_search("reset password", &[0.0, 0.0, 1.0], 2, &FusionConfig::default())
            .unwrap();
        assert!(results.len() <= 2);
        assert_eq!(results[0].document.id, 3);
    }

    #[test]
    fn test_empty_corpus_searches_empty() {
        let corpus = Corpus::build(
            Vec::new(),
            None,
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .unwrap();
        assert!(corpus.is_empty());
        assert!(corpus.sparse_search("anything", 5).is_empty());
    }

    #[test]
    fn test_document_lookup() {
        let corpus = Corpus::build(
            faq_docs(),
            None,
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .unwrap();
        assert_eq!(corpus.document(3).unwrap().id, 3);
        assert!(corpus.document(99).is_none());
    }
}
