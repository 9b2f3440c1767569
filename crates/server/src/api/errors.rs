//! API error types mapped to HTTP status codes.
//!
//! Each [`ApiError`] variant maps to a specific HTTP status code and produces
//! a JSON response body `{"error": "message"}`.

use crate::rag::AskError;
use crate::retriever::RetrieveError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ragserve_core::RetrievalError;
use serde_json::json;

/// Application-level error type that implements `IntoResponse`.
///
/// Each variant maps to an HTTP status code:
/// - `BadRequest` → 400
/// - `NotFound` → 404
/// - `ServiceUnavailable` → 503
/// - `BadGateway` → 502
/// - `Internal` → 500
#[derive(Debug)]
pub enum ApiError {
    /// Invalid request parameters (400).
    BadRequest(String),
    /// Resource not found (404).
    NotFound(String),
    /// Corpus snapshot not ready or poisoned (503).
    ServiceUnavailable(String),
    /// Upstream model dependency failed (502).
    BadGateway(String),
    /// Unexpected server error (500).
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<AskError> for ApiError {
    fn from(err: AskError) -> Self {
        match err {
            AskError::Retrieval(RetrieveError::Index(index)) => match index {
                RetrievalError::InvalidArgument(_) => ApiError::BadRequest(index.to_string()),
                RetrievalError::NotReady | RetrievalError::DimensionMismatch { .. } => {
                    ApiError::ServiceUnavailable(index.to_string())
                }
            },
            AskError::Retrieval(RetrieveError::Embedding(embed)) => {
                ApiError::BadGateway(embed.to_string())
            }
            AskError::Generation(gen) => ApiError::BadGateway(gen.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(ApiError::BadRequest("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::ServiceUnavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ApiError::BadGateway("upstream".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_ask_error_categories() {
        let not_ready = AskError::Retrieval(RetrieveError::Index(RetrievalError::NotReady));
        assert!(matches!(
            ApiError::from(not_ready),
            ApiError::ServiceUnavailable(_)
        ));

        let poisoned = AskError::Retrieval(RetrieveError::Index(
            RetrievalError::DimensionMismatch {
                expected: 384,
                actual: 4,
            },
        ));
        assert!(matches!(
            ApiError::from(poisoned),
            ApiError::ServiceUnavailable(_)
        ));

        let invalid = AskError::Retrieval(RetrieveError::Index(
            RetrievalError::InvalidArgument("k must be at least 1".into()),
        ));
        assert!(matches!(ApiError::from(invalid), ApiError::BadRequest(_)));

        let upstream = AskError::Generation(GenerationError::Timeout);
        assert!(matches!(ApiError::from(upstream), ApiError::BadGateway(_)));
    }
}
