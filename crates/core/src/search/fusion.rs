//! Fusion of sparse and dense sub-rankings.
//!
//! BM25 scores and distance-derived similarities live on unrelated unbounded
//! scales, so scores are normalized per sub-ranking before combination. Two
//! strategies are available:
//! - **MinMax**: per-list min-max normalization with an alpha-weighted sum
//! - **RRF** (Reciprocal Rank Fusion): rank-based, parameter-free

use crate::config::{FusionConfig, FusionMethod, RRF_K};
use crate::search::ranking::top_k;
use std::collections::HashMap;

/// Fuses two sub-rankings according to `config.method`, truncating to `k`.
pub fn fuse(
    sparse: &[(u32, f32)],
    dense: &[(u32, f32)],
    config: &FusionConfig,
    k: usize,
) -> Vec<(u32, f32)> {
    match config.method {
        FusionMethod::MinMax => min_max_fusion(sparse, dense, config.alpha, k),
        FusionMethod::Rrf => rrf_fusion(sparse, dense, k),
    }
}

/// Min-max normalization followed by a weighted sum.
///
/// Each sub-ranking's scores are normalized to `[0, 1]` within its returned
/// candidate set; a degenerate set (single score, or all equal) maps to 1.0.
/// `fused(d) = alpha * norm_sparse(d) + (1 - alpha) * norm_dense(d)`, with a
/// document missing from one side receiving 0 for that side rather than
/// being excluded. Normalization makes the fused ranking invariant to
/// uniformly rescaling either side's raw scores.
///
/// At the extreme weights only the weighted side's candidates are fused:
/// the other side contributes zero score anyway, and its candidates would
/// otherwise tie at 0.0 with the weighted side's normalized minimum and
/// could displace a real result through the id tie-break. Dropping them
/// makes `alpha = 1.0` reproduce the sparse ordering exactly and
/// `alpha = 0.0` the dense ordering, disjoint candidate tails included.
pub fn min_max_fusion(
    sparse: &[(u32, f32)],
    dense: &[(u32, f32)],
    alpha: f32,
    k: usize,
) -> Vec<(u32, f32)> {
    let (sparse, dense): (&[(u32, f32)], &[(u32, f32)]) = if alpha >= 1.0 {
        (sparse, &[])
    } else if alpha <= 0.0 {
        (&[], dense)
    } else {
        (sparse, dense)
    };

    let mut scores: HashMap<u32, f32> = HashMap::with_capacity(sparse.len() + dense.len());

    accumulate_normalized(&mut scores, sparse, alpha);
    accumulate_normalized(&mut scores, dense, 1.0 - alpha);

    top_k(scores, k)
}

/// Normalize one sub-ranking in place and accumulate its weighted scores.
fn accumulate_normalized(scores: &mut HashMap<u32, f32>, results: &[(u32, f32)], weight: f32) {
    if let Some((min, max)) = min_max(results) {
        let range = max - min;
        for &(id, score) in results {
            let norm = if range < f32::EPSILON {
                1.0
            } else {
                (score - min) / range
            };
            *scores.entry(id).or_insert(0.0) += weight * norm;
        }
    }
}

/// Reciprocal Rank Fusion over two ranked lists.
///
/// `fused(d) = sum(1 / (RRF_K + rank_i(d)))` with 1-based ranks. Scale-free:
/// only positions matter, never raw scores.
pub fn rrf_fusion(sparse: &[(u32, f32)], dense: &[(u32, f32)], k: usize) -> Vec<(u32, f32)> {
    let mut scores: HashMap<u32, f32> = HashMap::with_capacity(sparse.len() + dense.len());

    for (rank, (id, _)) in sparse.iter().enumerate() {
        *scores.entry(*id).or_insert(0.0) += 1.0 / (RRF_K + rank as f32 + 1.0);
    }
    for (rank, (id, _)) in dense.iter().enumerate() {
        *scores.entry(*id).or_insert(0.0) += 1.0 / (RRF_K + rank as f32 + 1.0);
    }

    top_k(scores, k)
}

/// Single-pass min/max computation.
fn min_max(results: &[(u32, f32)]) -> Option<(f32, f32)> {
    if results.is_empty() {
        return None;
    }
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &(_, s) in results {
        if s < min {
            min = s;
        }
        if s > max {
            max = s;
        }
    }
    Some((min, max))
}
