//! Inverted index for BM25 scoring.
//!
//! Maps terms to postings lists (internal document id + term frequency).
//! Built once per corpus snapshot; there is no removal path because snapshots
//! are immutable and rebuilt wholesale.

use crate::bm25::tokenizer::tokenize;
use std::collections::HashMap;

/// A single entry in a term's postings list.
#[derive(Debug, Clone)]
pub struct Posting {
    /// Internal u32 document id.
    pub doc_id: u32,
    /// Number of times the term appears in this document.
    pub term_frequency: u32,
}

/// Inverted index mapping terms to postings lists.
///
/// Document lengths are tracked for BM25 length normalization. Internal ids
/// are dense and assigned in corpus build order.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    /// term → postings, in ascending internal-id order per term.
    pub index: HashMap<String, Vec<Posting>>,
    /// internal_id → document length in tokens.
    pub doc_lengths: Vec<u32>,
    /// Total number of documents indexed.
    pub doc_count: u32,
    /// Sum of all document lengths, for the average.
    pub total_doc_length: u64,
}

impl InvertedIndex {
    /// Creates a new empty inverted index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a document's text under its internal u32 id.
    ///
    /// Internal ids must be added in ascending order so postings lists stay
    /// sorted; the corpus builder guarantees this.
    pub fn add_document(&mut self, internal_id: u32, text: &str) {
        let tokens = tokenize(text);
        let doc_len = tokens.len() as u32;

        let idx = internal_id as usize;
        if idx >= self.doc_lengths.len() {
            self.doc_lengths.resize(idx + 1, 0);
        }
        self.doc_lengths[idx] = doc_len;
        self.doc_count += 1;
        self.total_doc_length += doc_len as u64;

        let mut tf_map: HashMap<&str, u32> = HashMap::new();
        for token in tokens.iter() {
            *tf_map.entry(token).or_insert(0) += 1;
        }

        for (term, tf) in tf_map {
            self.index
                .entry(term.to_string())
                .or_default()
                .push(Posting {
                    doc_id: internal_id,
                    term_frequency: tf,
                });
        }
    }

    /// Returns the average document length across all indexed documents.
    pub fn average_doc_length(&self) -> f32 {
        if self.doc_count == 0 {
            return 0.0;
        }
        self.total_doc_length as f32 / self.doc_count as f32
    }
}
