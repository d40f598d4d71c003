//! Error types for nook-rg
//!
//! Every terminal failure maps to a stable machine-readable tag plus a
//! human-readable message, mirrored from the client contract. Logs are
//! diagnostic only and never drive control flow.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client input error (400), surfaced before any external call
    #[error("{message}")]
    BadRequest { tag: &'static str, message: String },

    /// Unknown resource (404)
    #[error("not found")]
    NotFound,

    /// Upstream contract violation (502) - the backend answered but the
    /// payload failed schema validation
    #[error("{message}")]
    BadGateway { tag: &'static str, message: String },

    /// Pipeline failure (500)
    #[error("{message}")]
    Failed { tag: &'static str, message: String },

    /// Unparseable model output (500); carries the raw backend text so the
    /// caller can diagnose what came back
    #[error("Failed to parse AI response")]
    InvalidAiResponse { raw: String },
}

impl ApiError {
    pub fn bad_request(tag: &'static str) -> Self {
        Self::BadRequest {
            tag,
            message: String::new(),
        }
    }

    pub fn bad_request_with(tag: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            tag,
            message: message.into(),
        }
    }

    pub fn bad_gateway(tag: &'static str, message: impl Into<String>) -> Self {
        Self::BadGateway {
            tag,
            message: message.into(),
        }
    }

    pub fn failed(tag: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            tag,
            message: message.into(),
        }
    }
}

fn error_body(tag: &str, message: &str) -> Value {
    if message.is_empty() {
        json!({ "error": tag })
    } else {
        json!({ "error": tag, "message": message })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest { tag, message } => {
                (StatusCode::BAD_REQUEST, error_body(tag, &message))
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, error_body("not_found", "")),
            ApiError::BadGateway { tag, message } => {
                (StatusCode::BAD_GATEWAY, error_body(tag, &message))
            }
            ApiError::Failed { tag, message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_body(tag, &message))
            }
            ApiError::InvalidAiResponse { raw } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "invalid_ai_response",
                    "message": "Failed to parse AI response",
                    "rawResponse": raw,
                }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
