//! API response types
//!
//! Every route answers with the same envelope: `{success, data}` on
//! success and `{success: false, error: {code, message, details?}}` on failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docbatch_common::FailureKind;
use serde::Serialize;

/// Standard success response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new success response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an error response with details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }
}

/// HTTP status for a failure class
pub fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::ValidationRejection => StatusCode::BAD_REQUEST,
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::PersistenceFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the error envelope for a classified failure.
///
/// Persistence failures carry the proximate cause so callers can tell a
/// constraint violation from lost connectivity.
pub fn failure_response(kind: FailureKind, message: impl Into<String>) -> Response {
    let message = message.into();
    if kind == FailureKind::PersistenceFailure {
        tracing::error!(code = kind.code(), "{}", message);
    } else {
        tracing::debug!(code = kind.code(), "{}", message);
    }

    let body = ErrorResponse::with_details(
        kind.code(),
        message,
        serde_json::json!({ "kind": kind }),
    );
    (status_for(kind), Json(body)).into_response()
}
