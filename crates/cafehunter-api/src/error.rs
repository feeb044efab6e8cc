//! API error types and JSON error response formatting.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use cafehunter_core::error::CafeHunterError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "forbidden").
    pub error: String,
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - undecodable webhook delivery.
    BadRequest(String),
    /// 403 Forbidden - verification token mismatch.
    Forbidden(String),
    /// 500 Internal Server Error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::Internal(msg) => {
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

impl From<CafeHunterError> for ApiError {
    fn from(err: CafeHunterError) -> Self {
        match &err {
            CafeHunterError::Config(msg) => ApiError::BadRequest(msg.clone()),
            CafeHunterError::Serialization(msg) => ApiError::BadRequest(msg.clone()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
