//! Shared top-k selection with deterministic ordering.
//!
//! Every ranked surface in the engine (BM25, vector scan, fusion) funnels
//! through [`top_k`] so the ordering contract lives in one place: descending
//! score, ties broken by ascending internal id. Float comparisons never rely
//! on exact equality for ranking; `OrderedFloat` gives a total order and the
//! id tiebreak keeps results reproducible across hash-map iteration orders.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Selects the `k` best `(internal_id, score)` pairs.
///
/// Partial sort in O(n log k) via a bounded min-heap: the heap keeps the
/// current best `k`, evicting the lowest score (largest id among equals) as
/// better candidates arrive. The returned vector is fully sorted by
/// descending score, ascending id.
pub fn top_k(scores: impl IntoIterator<Item = (u32, f32)>, k: usize) -> Vec<(u32, f32)> {
    if k == 0 {
        return Vec::new();
    }

    // Heap entries order by (score, Reverse(id)): the heap minimum is the
    // lowest score, and among equal scores the largest id, which is exactly
    // the candidate to evict.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f32>, Reverse<u32>)>> =
        BinaryHeap::with_capacity(k + 1);
    for (id, score) in scores {
        heap.push(Reverse((OrderedFloat(score), Reverse(id))));
        if heap.len() > k {
            heap.pop();
        }
    }

    let mut results: Vec<(u32, f32)> = heap
        .into_iter()
        .map(|Reverse((s, Reverse(id)))| (id, s.0))
        .collect();
    results.sort_unstable_by_key(|&(id, score)| (Reverse(OrderedFloat(score)), id));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_orders_by_descending_score() {
        let results = top_k(vec![(0, 1.0), (1, 3.0), (2, 2.0)], 10);
        assert_eq!(results, vec![(1, 3.0), (2, 2.0), (0, 1.0)]);
    }

    #[test]
    fn test_top_k_truncates() {
        let results = top_k((0..100).map(|i| (i, i as f32)), 5);
        assert_eq!(results.len(), 5);
        assert_eq!(results[0], (99, 99.0));
        assert_eq!(results[4], (95, 95.0));
    }

    #[test]
    fn test_top_k_equal_scores_ascending_id() {
        // Insertion order must not matter.
        let forward = top_k(vec![(1, 0.5), (2, 0.5), (3, 0.5)], 2);
        let backward = top_k(vec![(3, 0.5), (2, 0.5), (1, 0.5)], 2);
        assert_eq!(forward, vec![(1, 0.5), (2, 0.5)]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_top_k_zero_k() {
        assert!(top_k(vec![(0, 1.0)], 0).is_empty());
    }

    #[test]
    fn test_top_k_empty_input() {
        assert!(top_k(Vec::new(), 5).is_empty());
    }

    #[test]
    fn test_top_k_eviction_keeps_smallest_id_on_tie() {
        // k=1 with equal scores: the smaller id must survive regardless of
        // which was pushed first.
        assert_eq!(top_k(vec![(7, 1.0), (2, 1.0)], 1), vec![(2, 1.0)]);
        assert_eq!(top_k(vec![(2, 1.0), (7, 1.0)], 1), vec![(2, 1.0)]);
    }
}
