//! Handler error type and its HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::storage::{Collection, StoreError};

/// Error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

/// Errors returned by request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The requested record does not exist.
    NotFound(Collection, String),
    /// The request body is malformed or misses required fields.
    Validation(String),
    /// Anything else. The detail is logged, never sent to the client.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(..) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(collection, id) => {
                write!(f, "No record {} in {}", id, collection)
            }
            ApiError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::NotFound(collection, id) => {
                tracing::debug!("{} {} not found", collection, id);
                ErrorBody {
                    error: "not_found".to_string(),
                    message: format!("No {} entry with id {}", collection, id),
                }
            }
            ApiError::Validation(message) => {
                tracing::warn!("Rejected request: {}", message);
                ErrorBody {
                    error: "invalid_request".to_string(),
                    message,
                }
            }
            ApiError::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                ErrorBody {
                    error: "internal".to_string(),
                    message: "Internal server error".to_string(),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Requires a present, non-blank text field.
pub(crate) fn require_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(ApiError::Validation(format!("{} must not be empty", field))),
        None => Err(ApiError::Validation(format!("{} is required", field))),
    }
}
