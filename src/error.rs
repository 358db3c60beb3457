//! Error types and error handling for the application
//!
//! `AppError` is the caller-facing error returned by every public chat
//! operation. Store and completion failures are logged where they happen and
//! mapped to a generic `Internal` message, so raw backend detail never leaves
//! the process. All variants implement `IntoResponse` for the HTTP adapter.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message used for every session lookup that fails ownership or existence
pub const SESSION_NOT_FOUND: &str = "Chat session not found";

/// Application-level error types
///
/// Only `NotFound` is distinguished from generic failures so that callers can
/// render "session not found" instead of an opaque error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Session is absent or not owned by the caller
    #[error("{0}")]
    NotFound(String),

    /// Request failed validation before reaching the core
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Caller identity is missing
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Generic failure; carries only a fixed, caller-safe message
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Not-found error for a chat session
    pub fn session_not_found() -> Self {
        AppError::NotFound(SESSION_NOT_FOUND.to_string())
    }

    /// Generic internal error with a caller-safe message
    pub fn internal(message: &str) -> Self {
        AppError::Internal(message.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
