//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! **Security note:** internal errors are logged with full detail but only
//! a generic message is returned to the caller so that connection strings,
//! SQL, or upstream response bodies never leak to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::llm::CompletionError;

/// All errors that can occur in the request lifecycle.
///
/// Persistence failures are deliberately absent: history reads degrade to
/// empty and history writes are best-effort, so the store never fails a
/// request once the server is up.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The upstream completion call failed (network, auth, quota, timeout).
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),

            // Upstream errors: log the full detail, keep the client message
            // generic.  No retry or fallback model exists, so the caller
            // simply observes the failure.
            ServerError::Completion(e) => {
                error!(error = %e, "completion request failed");
                let message = match e {
                    CompletionError::Timeout { secs } => {
                        format!("completion timed out after {secs}s")
                    }
                    _ => "completion service error".to_owned(),
                };
                (StatusCode::BAD_GATEWAY, message)
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}
