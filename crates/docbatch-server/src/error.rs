//! Errors for service-level endpoints outside the feature slices

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::db::DbError;

/// Result type alias for server operations
pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// The store cannot be reached
    #[error("Service unavailable: {0}")]
    Unavailable(#[from] DbError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unavailable(ref e) => {
                tracing::warn!("Service unavailable: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ErrorResponse::new("SERVICE_UNAVAILABLE", self.to_string())),
                )
                    .into_response()
            },
        }
    }
}
