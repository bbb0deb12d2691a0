//! Error types for stub-backend

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use search_dashboard::model::ApiResponse;
use thiserror::Error;

/// Result type alias for stub operations
pub type Result<T> = std::result::Result<T, StubError>;

/// Stub backend error types
#[derive(Error, Debug)]
pub enum StubError {
    /// Unknown source or keyword
    #[error("{0}")]
    NotFound(String),

    /// Malformed request content
    #[error("{0}")]
    BadRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StubError {
    fn status(&self) -> StatusCode {
        match self {
            StubError::NotFound(_) => StatusCode::NOT_FOUND,
            StubError::BadRequest(_) => StatusCode::BAD_REQUEST,
            StubError::Config(_) | StubError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors leave as a `success: false` envelope
impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::failure(self.to_string());
        (self.status(), Json(body)).into_response()
    }
}
