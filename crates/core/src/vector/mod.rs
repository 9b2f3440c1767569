//! Exact vector search: distance metrics and a flat scan index.

/// Distance metric implementations.
pub mod distance;
/// Flat exact-scan index.
pub mod index;

pub use distance::DistanceMetric;
pub use index::VectorIndex;
