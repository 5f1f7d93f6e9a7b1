use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the HTTP handlers. Every response body is the same
/// `{"message": ...}` envelope the frontend reads; storage and transport
/// failures collapse to a generic message so internals never leak.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad or missing request fields. The message is client-facing.
    #[error("{0}")]
    Validation(String),

    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule was violated on registration.
    #[error("{0}")]
    Duplicate(String),

    /// The mail API rejected or failed a send the caller required.
    #[error("{0}")]
    Transport(String),

    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(message) | AppError::Duplicate(message) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Transport(message) => {
                error!(%message, "mail transport failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
            AppError::Persistence(e) => {
                error!(error = ?e, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
