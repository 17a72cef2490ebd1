//! API error types and response formatting.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error type with HTTP status code mapping.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Ansible could not be run or exited with an error (502)
    #[error("{message}")]
    ExecutionFailed {
        /// Human-readable description
        message: String,
        /// Exit code, if the process exited
        exit_code: Option<i32>,
        /// Captured standard error
        stderr: Option<String>,
    },

    /// Ansible exceeded the configured timeout (504)
    #[error("Execution timed out: {0}")]
    Timeout(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ExecutionFailed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for machine parsing.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ExecutionFailed { .. } => "EXECUTION_FAILED",
            ApiError::Timeout(_) => "TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::ExecutionFailed {
                exit_code, stderr, ..
            } => Some(json!({
                "exit_code": exit_code,
                "stderr": stderr,
            })),
            _ => None,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for machine parsing
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<crate::error::Error> for ApiError {
    fn from(err: crate::error::Error) -> Self {
        use crate::error::Error;

        match err {
            Error::InvalidRequest(msg) => ApiError::BadRequest(msg),
            Error::Spawn { .. } => ApiError::ExecutionFailed {
                message: err.to_string(),
                exit_code: None,
                stderr: None,
            },
            Error::ExecutionFailed {
                ref exit_code,
                ref stderr,
                ..
            } => ApiError::ExecutionFailed {
                exit_code: *exit_code,
                stderr: Some(stderr.clone()),
                message: err.to_string(),
            },
            Error::Timeout(_) => ApiError::Timeout(err.to_string()),
            Error::Config(_) | Error::Io(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
