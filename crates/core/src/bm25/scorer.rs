//! BM25 Okapi scoring.
//!
//! Scores documents against a query with configurable `k1` and `b`
//! parameters (see [`crate::config::Bm25Config`]).

use crate::bm25::inverted_index::InvertedIndex;
use crate::bm25::tokenizer::tokenize;
use crate::config::Bm25Config;
use crate::search::ranking::top_k;
use std::collections::HashMap;

/// BM25 Okapi scoring for a query against the inverted index.
///
/// Returns up to `k` scored documents `(internal_id, score)` sorted by
/// descending score, ties by ascending internal id. Documents with zero
/// query-term overlap are excluded, not scored 0. An empty query, an empty
/// index, or a query of entirely unseen terms all yield an empty result.
pub fn bm25_search(
    index: &InvertedIndex,
    query: &str,
    k: usize,
    config: Bm25Config,
) -> Vec<(u32, f32)> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() || index.doc_count == 0 {
        return Vec::new();
    }

    let avgdl = index.average_doc_length();
    let n = index.doc_count as f32;
    let Bm25Config { k1, b } = config;

    let mut scores: HashMap<u32, f32> = HashMap::with_capacity(256.min(index.doc_count as usize));

    for token in query_tokens.iter() {
        // Unseen terms have no postings and contribute nothing.
        if let Some(postings) = index.index.get(token) {
            let df = postings.len() as f32;
            // IDF: log((N - df + 0.5) / (df + 0.5) + 1)
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for posting in postings {
                let dl = if (posting.doc_id as usize) < index.doc_lengths.len() {
                    index.doc_lengths[posting.doc_id as usize] as f32
                } else {
                    0.0
                };
                let tf = posting.term_frequency as f32;

                let tf_norm = (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * dl / avgdl));
                *scores.entry(posting.doc_id).or_insert(0.0) += idf * tf_norm;
            }
        }
    }

    top_k(scores, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_corpus() -> InvertedIndex {
        let mut idx = InvertedIndex::new();
        idx.add_document(0, "reset your account password");
        idx.add_document(1, "billing invoice and payment methods");
        idx.add_document(2, "shipping times and tracking");
        idx.add_document(3, "password requirements and account security");
        idx
    }

    #[test]
    fn test_bm25_empty_query() {
        let idx = build_corpus();
        assert!(bm25_search(&idx, "", 10, Bm25Config::default()).is_empty());
    }

    #[test]
    fn test_bm25_empty_index() {
        let idx = InvertedIndex::new();
        assert!(bm25_search(&idx, "password", 10, Bm25Config::default()).is_empty());
    }

    #[test]
    fn test_bm25_excludes_zero_overlap() {
        let mut idx = InvertedIndex::new();
        idx.add_document(0, "reset password");
        idx.add_document(1, "billing invoice");
        let results = bm25_search(&idx, "password", 10, Bm25Config::default());
        let ids: Vec<u32> = results.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![0], "zero-overlap doc must be excluded, not scored 0");
    }

    #[test]
    fn test_bm25_unseen_term_is_not_an_error() {
        let idx = build_corpus();
        let results = bm25_search(&idx, "frobnicate", 10, Bm25Config::default());
        assert!(results.is_empty());
        // Mixed query: the unseen term contributes nothing.
        let results = bm25_search(&idx, "frobnicate password", 10, Bm25Config::default());
        let ids: Vec<u32> = results.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&0) && ids.contains(&3));
    }

    #[test]
    fn test_bm25_higher_tf_ranks_first() {
        let mut idx = InvertedIndex::new();
        idx.add_document(0, "password password password");
        idx.add_document(1, "password settings");
        let results = bm25_search(&idx, "password", 10, Bm25Config::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, 0, "doc with higher TF should rank first");
    }

    #[test]
    fn test_bm25_ties_break_by_ascending_id() {
        let mut idx = InvertedIndex::new();
        // Identical documents score identically.
        idx.add_document(0, "shipping tracking");
        idx.add_document(1, "shipping tracking");
        idx.add_document(2, "shipping tracking");
        let results = bm25_search(&idx, "shipping", 2, Bm25Config::default());
        let ids: Vec<u32> = results.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_bm25_k_truncation_and_positive_scores() {
        let idx = build_corpus();
        let results = bm25_search(&idx, "account password", 1, Bm25Config::default());
        assert_eq!(results.len(), 1);
        for &(_, score) in &results {
            assert!(score > 0.0, "BM25 scores should be positive, got {score}");
        }
    }

    #[test]
    fn test_bm25_custom_parameters() {
        let mut idx = InvertedIndex::new();
        idx.add_document(0, "password password password password long document here");
        idx.add_document(1, "password");
        // b = 0 disables length normalization entirely; the high-TF doc wins.
        let results = bm25_search(&idx, "password", 10, Bm25Config { k1: 1.5, b: 0.0 });
        assert_eq!(results[0].0, 0);
    }
}
