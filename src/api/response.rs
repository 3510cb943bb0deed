//! Response types for the Leave Entitlement Engine API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an unauthorized error response.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates an error response with the given status and body.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let (status, code) = match &error {
            EngineError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            EngineError::Eligibility { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "ELIGIBILITY_ERROR")
            }
            EngineError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            EngineError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            EngineError::ConcurrencyConflict { .. } => {
                (StatusCode::CONFLICT, "CONCURRENCY_CONFLICT")
            }
            EngineError::Persistence { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "PERSISTENCE_ERROR")
            }
            EngineError::EmployeeNotFound { .. } => (StatusCode::NOT_FOUND, "EMPLOYEE_NOT_FOUND"),
            EngineError::LeaveTypeNotFound { .. } => {
                (StatusCode::NOT_FOUND, "LEAVE_TYPE_NOT_FOUND")
            }
            EngineError::RequestNotFound { .. } => (StatusCode::NOT_FOUND, "REQUEST_NOT_FOUND"),
            EngineError::BalanceNotFound { .. } => (StatusCode::NOT_FOUND, "BALANCE_NOT_FOUND"),
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
        };

        ApiErrorResponse {
            status,
            error: ApiError::new(code, error.to_string()),
        }
    }
}
