//! API error handling for the Conecto server.

use crate::publication::PublicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API error envelope returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub timestamp: u64,
}

impl ApiError {
    pub fn new(code: u16, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            timestamp: chrono::Utc::now().timestamp() as u64,
        }
    }

    pub fn with_details(code: u16, message: String, details: serde_json::Value) -> Self {
        Self {
            code,
            message,
            details: Some(details),
            timestamp: chrono::Utc::now().timestamp() as u64,
        }
    }

    // Common error constructors
    pub fn bad_request(message: &str) -> Self {
        Self::new(400, message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(404, message.to_string())
    }

    pub fn conflict(message: &str) -> Self {
        Self::new(409, message.to_string())
    }

    pub fn unprocessable_entity(message: &str) -> Self {
        Self::new(422, message.to_string())
    }

    pub fn internal_server_error(message: &str) -> Self {
        Self::new(500, message.to_string())
    }

    pub fn handle_not_found(handle: &str) -> Self {
        Self::with_details(
            404,
            "Handle not found".to_string(),
            serde_json::json!({
                "handle": handle
            }),
        )
    }

    pub fn handle_already_claimed(handle: &str) -> Self {
        Self::with_details(
            409,
            "Handle already claimed".to_string(),
            serde_json::json!({
                "handle": handle
            }),
        )
    }

    pub fn ledger_error(reason: &str) -> Self {
        Self::with_details(
            500,
            "Ledger error".to_string(),
            serde_json::json!({
                "reason": reason
            }),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal_server_error(&err.to_string())
    }
}

impl From<PublicationError> for ApiError {
    fn from(err: PublicationError) -> Self {
        match err {
            PublicationError::InFlight => Self::conflict(&err.to_string()),
            PublicationError::Ledger { .. } => Self::ledger_error(&err.to_string()),
        }
    }
}

/// Validation error details
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub value: Option<serde_json::Value>,
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::with_details(
            422,
            "Validation failed".to_string(),
            serde_json::to_value(err).unwrap_or(serde_json::Value::Null),
        )
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
