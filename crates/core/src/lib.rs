//! # ragserve-core
//!
//! Deterministic retrieval engine for a small, fully in-memory knowledge
//! base: BM25 lexical ranking, exact vector-similarity ranking, and score
//! fusion over immutable corpus snapshots.
//!
//! This is the core library crate with zero async dependencies. Embedding
//! computation and text generation are external capabilities consumed by the
//! server crate; everything here is synchronous and testable without fakes
//! touching the network.

/// BM25 lexical retrieval: tokenizer, inverted index, Okapi scorer.
pub mod bm25;
/// Tuning parameters: BM25 constants, fusion weight, over-fetch factor.
pub mod config;
/// Corpus snapshot with precomputed retrieval structures.
pub mod corpus;
/// Knowledge-base document types.
pub mod document;
/// Retrieval error taxonomy.
pub mod error;
/// Search primitives: deterministic top-k, fusion, scored results.
pub mod search;
/// Atomic snapshot handle for wholesale rebuilds.
pub mod snapshot;
/// Exact vector search: distance metrics and a flat scan index.
pub mod vector;

pub use config::{Bm25Config, FusionConfig, FusionMethod};
pub use corpus::Corpus;
pub use document::{DocId, Document};
pub use error::RetrievalError;
pub use search::ScoredDocument;
pub use snapshot::CorpusHandle;
pub use vector::DistanceMetric;
