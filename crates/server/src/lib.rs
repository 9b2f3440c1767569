//! ragserve-server — HTTP server for ragserve.
//!
//! Provides the REST API, the retrieve/generate/persist orchestration, and
//! the clients for external embedding and generation backends. Retrieval
//! algorithms live in `ragserve-core`.

/// REST API layer: Axum router, HTTP handlers, models, metrics.
pub mod api;
/// Embedding backend client and trait.
pub mod embedding;
/// Answer generation backend clients and prompt assembly.
pub mod generation;
/// Corpus ingestion and snapshot rebuilds.
pub mod ingest;
/// Question answering orchestration.
pub mod rag;
/// Retrieval strategies over the corpus snapshot.
pub mod retriever;
/// SQLite-backed document and history store.
pub mod store;
