//! API error types and JSON error response formatting.
//!
//! Every failing endpoint answers with the same `{error, message}` body and a
//! status code derived from the underlying chat or core error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use krishi_chat::ChatError;
use krishi_core::error::KrishiError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - malformed or unsupported parameter.
    BadRequest(String),
    /// 409 Conflict - operation not valid in the conversation's current state.
    Conflict(String),
    /// 422 Unprocessable Entity - well-formed but rejected by validation.
    UnprocessableEntity(String),
    /// 500 Internal Server Error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable_entity", msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal API error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match &err {
            ChatError::UnsupportedLocale(_) | ChatError::EmptyMessage => {
                ApiError::BadRequest(err.to_string())
            }
            ChatError::MessageTooLong(_) => ApiError::UnprocessableEntity(err.to_string()),
            ChatError::SeedAfterStart => ApiError::Conflict(err.to_string()),
            ChatError::InvalidRuleTable { .. } | ChatError::Config(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<KrishiError> for ApiError {
    fn from(err: KrishiError) -> Self {
        match &err {
            KrishiError::UnsupportedLocale(_) => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
