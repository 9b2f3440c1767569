//! Scored result type shared by all retrieval strategies.

use crate::document::Document;
use std::sync::Arc;

/// A document with a relevance score from one query.
///
/// Transient: produced per query, never persisted. Score semantics depend on
/// the strategy that produced it:
/// - **Sparse**: raw BM25 score (higher = more relevant)
/// - **Dense**: distance-derived similarity `1 / (1 + d)` (higher = closer)
/// - **Hybrid**: fused score (min-max weighted sum or RRF)
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    /// The matched document (shared reference into the snapshot).
    pub document: Arc<Document>,
    pub score: f32,
}
