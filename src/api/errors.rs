use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Everything a handler can fail with. Nothing here is fatal to the process:
/// each variant maps to a response the dashboard can present.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request field; the caller corrects the input.
    #[error("{0}")]
    Validation(String),
    #[error("No token provided")]
    NoToken,
    #[error("Invalid token")]
    InvalidToken,
    /// Empty result set — "no data yet", not a failure state.
    #[error("{0}")]
    NotFound(String),
    /// Downstream/store failure. The cause is logged, never echoed.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": msg })),
            )
                .into_response(),
            ApiError::NoToken | ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "error": msg })),
            )
                .into_response(),
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "Unhandled error in request handler");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Something went wrong!" })),
                )
                    .into_response()
            }
        }
    }
}
