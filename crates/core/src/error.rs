//! Retrieval error taxonomy.
//!
//! All retrieval and fusion errors are synchronous and local. There is no
//! retry machinery here; retry policy, if any, belongs to the boundary layer.

use thiserror::Error;

/// Errors produced by index construction and retrieval.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetrievalError {
    /// Client-facing validation failure (k < 1, duplicate document ids, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No corpus snapshot has been installed yet.
    #[error("index not ready")]
    NotReady,

    /// Inconsistent embedding dimensionality. Fatal at construction: a handle
    /// poisoned by this error refuses to serve queries afterwards.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
