//! Error types for quoter-server
//!
//! Every handler returns `ApiResult<T>`; the status code is the API
//! contract, the JSON body is informational.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid or missing request parameter (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Access key not supplied (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Access key rejected (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict (409) - e.g. attachment already linked to the quote
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Gone (410) - referenced attachment doesn't exist
    #[error("Gone: {0}")]
    Gone(String),

    /// Music context unavailable (418)
    #[error("Music library unavailable")]
    Teapot,

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error outside of quoter-common
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// quoter-common error
    #[error("Common error: {0}")]
    Common(#[from] quoter_common::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Gone(_) => StatusCode::GONE,
            ApiError::Teapot => StatusCode::IM_A_TEAPOT,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Common(err) => match err {
                quoter_common::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                quoter_common::Error::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Gone(_) => "GONE",
            ApiError::Teapot => "IM_A_TEAPOT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Common(_) => "COMMON_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
