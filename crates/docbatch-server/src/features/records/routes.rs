//! Record API routes
//!
//! Read-only passthroughs over the stored records:
//!
//! - `GET /api/v1/records` - All records, newest first
//! - `GET /api/v1/records/:id` - A single record

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::SqlitePool;

use super::queries::{GetRecordError, GetRecordQuery, ListRecordsError, ListRecordsQuery};
use crate::api::response::{failure_response, ApiResponse};

pub fn records_routes() -> Router<SqlitePool> {
    Router::new()
        .route("/", get(list_records))
        .route("/:id", get(get_record))
}

#[tracing::instrument(skip(pool))]
async fn list_records(State(pool): State<SqlitePool>) -> Result<Response, RecordApiError> {
    let response = super::queries::list::handle(pool, ListRecordsQuery::default()).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool))]
async fn get_record(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Response, RecordApiError> {
    let response = super::queries::get::handle(pool, GetRecordQuery { id }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
enum RecordApiError {
    List(ListRecordsError),
    Get(GetRecordError),
}

impl From<ListRecordsError> for RecordApiError {
    fn from(err: ListRecordsError) -> Self {
        Self::List(err)
    }
}

impl From<GetRecordError> for RecordApiError {
    fn from(err: GetRecordError) -> Self {
        Self::Get(err)
    }
}

impl IntoResponse for RecordApiError {
    fn into_response(self) -> Response {
        match self {
            RecordApiError::List(e) => failure_response(e.kind(), e.to_string()),
            RecordApiError::Get(e) => failure_response(e.kind(), e.to_string()),
        }
    }
}
