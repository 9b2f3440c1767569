//! Knowledge-base document type.
//!
//! A `Document` is a stored record with text content, a unique numeric id,
//! and optional key-value metadata. Documents are immutable once indexed and
//! are replaced wholesale when the corpus snapshot is rebuilt.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// External document identifier, unique within a corpus snapshot.
///
/// Assigned by the document store (SQLite rowids in the server); ranking ties
/// are broken by ascending `DocId` to keep ordering reproducible.
pub type DocId = i64;

/// A stored document with text content, unique id, and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    /// Text content, indexed by BM25 and embedded for dense retrieval.
    pub text: String,
    /// Optional key-value metadata carried through to API responses.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Creates a document with no metadata.
    pub fn new(id: DocId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            metadata: HashMap::new(),
        }
    }
}
