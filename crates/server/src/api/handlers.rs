//! HTTP request handlers and shared application state.
//!
//! Each public async function corresponds to an API route registered in
//! [`create_router`](crate::api::create_router). Handlers extract query/body
//! parameters via Axum extractors and delegate to the
//! [`RagService`](crate::rag::RagService) and [`SqliteStore`](crate::store::SqliteStore),
//! returning JSON responses or [`ApiError`](crate::api::errors::ApiError) on failure.

use crate::api::errors::ApiError;
use crate::api::metrics;
use crate::api::models::*;
use crate::embedding::Embedder;
use crate::ingest;
use crate::rag::RagService;
use crate::store::SqliteStore;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use ragserve_core::{config, Bm25Config, CorpusHandle, DistanceMetric};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<RagService>,
    pub handle: Arc<CorpusHandle>,
    pub store: Arc<SqliteStore>,
    pub embedder: Option<Arc<dyn Embedder>>,
    pub bm25: Bm25Config,
    pub metric: DistanceMetric,
    pub prometheus_handle: PrometheusHandle,
    pub start_time: Instant,
}

/// `POST /ask` — answer a question grounded in the indexed corpus.
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("Question must not be empty".into()));
    }

    let start = Instant::now();
    let result = state.rag.ask(question, request.k).await;
    let outcome = if result.is_ok() { "ok" } else { "error" };
    metrics::record_ask(outcome, start.elapsed());

    let answer = result?;
    Ok(Json(AskResponse {
        sources: answer
            .sources
            .into_iter()
            .map(|(id, score)| SourceResponse { id, score })
            .collect(),
        answer: answer.answer,
    }))
}

/// `GET /history` — list recent QA interactions, newest first.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = params.limit.min(config::MAX_HISTORY_LIMIT);
    let items = state
        .store
        .recent_history(limit, params.offset)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(Json(HistoryResponse { items }))
}

/// `GET /health` — liveness plus index readiness.
///
/// Returns 200 while the snapshot is ready and 503 before the first build or
/// after a poisoned rebuild, so load balancers stop routing questions to an
/// instance that cannot answer them.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ready = state.handle.is_ready();
    let documents = state.handle.corpus_size();
    let uptime = state.start_time.elapsed().as_secs();

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if ready { "ok" } else { "unavailable" },
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: uptime,
            documents,
            ready,
        }),
    )
}

/// `GET /metrics` — Prometheus exposition.
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

/// `POST /admin/reindex` — rebuild the corpus snapshot from the document
/// store and atomically swap it in. In-flight requests keep reading the old
/// snapshot until the swap completes.
pub async fn reindex(State(state): State<AppState>) -> Result<Json<ReindexResponse>, ApiError> {
    let start = Instant::now();
    let documents = ingest::rebuild_corpus(
        &state.store,
        &state.handle,
        state.embedder.as_deref(),
        state.bm25,
        state.metric,
    )
    .await
    .map_err(|err| {
        metrics::update_corpus_metrics(state.handle.corpus_size(), state.handle.is_ready());
        ApiError::ServiceUnavailable(err.to_string())
    })?;

    metrics::update_corpus_metrics(documents, true);
    tracing::info!(documents, elapsed_ms = start.elapsed().as_millis() as u64, "reindex complete");
    Ok(Json(ReindexResponse {
        documents,
        elapsed_ms: start.elapsed().as_millis() as u64,
    }))
}
