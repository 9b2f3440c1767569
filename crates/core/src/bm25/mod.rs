//! BM25 lexical retrieval: tokenizer, inverted index, and Okapi scorer.

/// Inverted index mapping terms to postings lists.
pub mod inverted_index;
/// BM25 Okapi scoring over the inverted index.
pub mod scorer;
/// Case-folding tokenizer with byte-span token storage.
pub mod tokenizer;

pub use inverted_index::InvertedIndex;
pub use scorer::bm25_search;
pub use tokenizer::tokenize;
