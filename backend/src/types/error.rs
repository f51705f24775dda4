//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::gallery::GalleryError;

/// Error body returned to API consumers
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// Application error type that wraps the error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            inner: ErrorResponse {
                error: message.into(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {}", self.inner.error),
            500..=599 => tracing::error!("Server error: {}", self.inner.error),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl OperationOutput for AppError {
    type Inner = ErrorResponse;
}

/// Every gallery failure is a server error carrying the failure text
impl From<GalleryError> for AppError {
    fn from(err: GalleryError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}
