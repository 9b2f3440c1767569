//! Request and response types for the REST API.

use crate::store::QaRecord;
use ragserve_core::DocId;
use serde::{Deserialize, Serialize};

fn default_k() -> usize {
    ragserve_core::config::DEFAULT_K
}

/// Request body for `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The question to answer.
    pub question: String,
    /// How many context documents to retrieve (clamped to the corpus size).
    #[serde(default = "default_k")]
    pub k: usize,
}

/// One retrieved source in an answer.
#[derive(Debug, Serialize)]
pub struct SourceResponse {
    pub id: DocId,
    pub score: f32,
}

/// Response body for `POST /ask`.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub sources: Vec<SourceResponse>,
}

/// Query parameters for `GET /history`.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(default = "default_history_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_history_limit() -> usize {
    20
}

/// Response body for `GET /history`.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub items: Vec<QaRecord>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub documents: usize,
    pub ready: bool,
}

/// Response body for `POST /admin/reindex`.
#[derive(Debug, Serialize)]
pub struct ReindexResponse {
    pub documents: usize,
    pub elapsed_ms: u64,
}
