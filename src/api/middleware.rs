use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
///
/// Every failure is caught at the interaction boundary and converted to
/// a user-visible message; none are fatal to the running session, and
/// nothing retries automatically.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    #[error("Insufficient columns: {0}")]
    InsufficientColumns(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match self {
            AppError::DuplicateIdentifier(msg) => (
                StatusCode::CONFLICT,
                ErrorDetail::new("DUPLICATE_IDENTIFIER", msg),
            ),
            // Engine message is passed through verbatim
            AppError::QueryFailed(msg) => {
                (StatusCode::BAD_REQUEST, ErrorDetail::new("QUERY_FAILED", msg))
            }
            AppError::TranslationFailed(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new("TRANSLATION_FAILED", msg),
            ),
            AppError::InsufficientColumns(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("INSUFFICIENT_COLUMNS", msg),
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorDetail::new("NOT_FOUND", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg),
            ),
        };

        let body = Json(ErrorResponse {
            error: error_detail,
        });

        (status, body).into_response()
    }
}

/// Convert anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
