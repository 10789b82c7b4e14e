//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.
//!
//! `ApiError` implements `IntoResponse` so handlers can return
//! `Result<T, ApiError>` directly; every variant renders as a JSON error
//! envelope `{"error": {"code", "message"}}`. Server-side detail is logged
//! here, and only user-safe messages leave the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::config::ConfigError;
use crate::extract::ExtractError;
use resume_coach_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// A request was missing required fields or carried invalid values.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The uploaded document could not be turned into text.
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    /// A call to the model provider failed outright.
    #[error("Model call failed: {0}")]
    ModelCall(String),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Port(PortError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone())
            }
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::Extraction(e @ ExtractError::UnsupportedFormat(_)) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_FORMAT", e.to_string())
            }
            ApiError::Extraction(e @ ExtractError::ExtractionFailed) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_FAILED",
                e.to_string(),
            ),
            ApiError::ModelCall(msg) => {
                tracing::error!("Model call failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MODEL_CALL_FAILED",
                    "The AI service could not be reached. Please try again.".to_string(),
                )
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            other => {
                tracing::error!("Internal error: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
