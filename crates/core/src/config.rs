//! Tuning parameters for scoring and fusion.
//!
//! Defaults are defined as constants; runtime overrides arrive through the
//! explicit config structs passed into each component at construction. There
//! is no global mutable state.

/// BM25 Okapi term frequency saturation parameter.
///
/// Controls how quickly term frequency saturates. Higher values allow TF to
/// grow more. Typical range: 1.0–2.0.
pub const BM25_K1: f32 = 1.5;

/// BM25 Okapi document length normalization parameter.
///
/// 0.0 = no normalization, 1.0 = full normalization.
pub const BM25_B: f32 = 0.75;

/// Default weight of the sparse side in min-max fusion.
pub const FUSION_ALPHA: f32 = 0.5;

/// Reciprocal Rank Fusion constant `k` in `1 / (k + rank)`.
///
/// Standard value from the original RRF paper.
pub const RRF_K: f32 = 60.0;

/// Default over-fetch multiplier for hybrid retrieval: each sub-retriever is
/// asked for `k * multiplier` candidates so enough survive fusion.
pub const OVERFETCH_MULTIPLIER: usize = 3;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default number of context documents retrieved per question.
pub const DEFAULT_K: usize = 3;

/// Whole-request timeout applied by the server middleware, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Timeout for one generation call to the model backend, in seconds.
pub const GENERATION_TIMEOUT_SECS: u64 = 90;

/// Timeout for one embedding call to the model backend, in seconds.
pub const EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Maximum accepted HTTP request body size in bytes.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Maximum number of requests processed concurrently.
pub const MAX_CONCURRENT_REQUESTS: usize = 256;

/// Server-wide request rate limit, per second.
pub const RATE_LIMIT_RPS: u64 = 100;

/// Upper bound on the `limit` parameter of the history listing.
pub const MAX_HISTORY_LIMIT: usize = 100;

/// BM25 scoring parameters.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Config {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self {
            k1: BM25_K1,
            b: BM25_B,
        }
    }
}

/// How sparse and dense sub-rankings are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionMethod {
    /// Per-list min-max normalization followed by an alpha-weighted sum.
    MinMax,
    /// Reciprocal Rank Fusion: rank-based, scale-free.
    Rrf,
}

/// Fusion parameters for hybrid retrieval.
#[derive(Debug, Clone, Copy)]
pub struct FusionConfig {
    /// Weight of the sparse side; the dense side gets `1 - alpha`.
    pub alpha: f32,
    pub method: FusionMethod,
    /// Sub-retrievers are over-fetched with `k * overfetch_multiplier`.
    pub overfetch_multiplier: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            alpha: FUSION_ALPHA,
            method: FusionMethod::MinMax,
            overfetch_multiplier: OVERFETCH_MULTIPLIER,
        }
    }
}
