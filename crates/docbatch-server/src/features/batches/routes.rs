//! Batch API routes
//!
//! - `POST /api/v1/batches` - Upload an archive (multipart field `file`)
//! - `GET /api/v1/batches` - List batches, newest first
//! - `GET /api/v1/batches/:id` - Get a batch with its records
//! - `DELETE /api/v1/batches/:id` - Delete a batch and its records

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};

use super::{
    commands::{DeleteBatchCommand, DeleteBatchError, UploadBatchCommand, UploadBatchError},
    queries::{GetBatchError, GetBatchQuery, ListBatchesError, ListBatchesQuery},
};
use crate::api::response::{failure_response, ApiResponse};
use crate::features::FeatureState;

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the batches router. Upload bodies are capped at
/// `max_upload_bytes`; the other routes keep axum's default limit.
pub fn batches_routes(max_upload_bytes: usize) -> Router<FeatureState> {
    Router::new()
        .route(
            "/",
            post(upload_batch).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/", get(list_batches))
        .route("/:id", get(get_batch))
        .route("/:id", delete(delete_batch))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Upload an archive and ingest its table
///
/// # Response
///
/// - `201 Created` - `{display_name, total_records}`
/// - `400 Bad Request` - Missing or repeated `file` part, empty upload, no target
///   entry, corrupt archive or malformed table
/// - `500 Internal Server Error` - Store failure, with its cause
#[tracing::instrument(skip(state, multipart))]
async fn upload_batch(
    State(state): State<FeatureState>,
    mut multipart: Multipart,
) -> Result<Response, BatchApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadBatchError::Multipart(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if upload.is_some() {
            return Err(UploadBatchError::DuplicateFile.into());
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| UploadBatchError::Multipart(e.body_text()))?;
        upload = Some((file_name, data.to_vec()));
    }

    let (file_name, content) = upload.ok_or(UploadBatchError::FileRequired)?;
    let command = UploadBatchCommand { file_name, content };

    let response =
        super::commands::upload::handle(state.db, state.ingest.clone(), command).await?;

    tracing::info!(
        display_name = %response.display_name,
        total_records = response.total_records,
        "Batch uploaded via API"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// Delete a batch and all of its records
///
/// # Response
///
/// - `200 OK` - `{display_name, deleted_records}`
/// - `404 Not Found` - No batch with this id
#[tracing::instrument(skip(state))]
async fn delete_batch(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
) -> Result<Response, BatchApiError> {
    let response = super::commands::delete::handle(
        state.db,
        state.ingest.write_mode,
        DeleteBatchCommand { id },
    )
    .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(state))]
async fn list_batches(State(state): State<FeatureState>) -> Result<Response, BatchApiError> {
    let response = super::queries::list::handle(state.db, ListBatchesQuery::default()).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state))]
async fn get_batch(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
) -> Result<Response, BatchApiError> {
    let response = super::queries::get::handle(state.db, GetBatchQuery { id }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum BatchApiError {
    Upload(UploadBatchError),
    Delete(DeleteBatchError),
    List(ListBatchesError),
    Get(GetBatchError),
}

impl From<UploadBatchError> for BatchApiError {
    fn from(err: UploadBatchError) -> Self {
        Self::Upload(err)
    }
}

impl From<DeleteBatchError> for BatchApiError {
    fn from(err: DeleteBatchError) -> Self {
        Self::Delete(err)
    }
}

impl From<ListBatchesError> for BatchApiError {
    fn from(err: ListBatchesError) -> Self {
        Self::List(err)
    }
}

impl From<GetBatchError> for BatchApiError {
    fn from(err: GetBatchError) -> Self {
        Self::Get(err)
    }
}

impl IntoResponse for BatchApiError {
    fn into_response(self) -> Response {
        let (kind, message) = match &self {
            BatchApiError::Upload(e) => (e.kind(), e.to_string()),
            BatchApiError::Delete(e) => (e.kind(), e.to_string()),
            BatchApiError::List(e) => (e.kind(), e.to_string()),
            BatchApiError::Get(e) => (e.kind(), e.to_string()),
        };
        failure_response(kind, message)
    }
}
