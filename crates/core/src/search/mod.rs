//! Search primitives: scored results, deterministic top-k, and fusion.

/// Fusion of sparse and dense sub-rankings.
pub mod fusion;
/// Deterministic top-k selection shared by every ranked surface.
pub mod ranking;
/// Scored result types.
pub mod types;

pub use types::ScoredDocument;
