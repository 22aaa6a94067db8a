// Error types: provider calls, the aggregation run, and HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Failure talking to the analytics provider. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected provider response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Failure of one aggregation run. Any property failing fails the whole run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("listing properties: {0}")]
    ListProperties(#[source] ProviderError),

    #[error("fetching sessions for property {property}: {source}")]
    Metrics {
        property: String,
        #[source]
        source: ProviderError,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not ready: {0}")]
    NotReady(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::NotReady(msg) => {
                tracing::debug!(reason = %msg, "request while snapshot not ready");
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
        };
        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}
