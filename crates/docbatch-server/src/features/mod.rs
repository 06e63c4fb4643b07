//! Feature modules implementing the docbatch API
//!
//! Each feature is a vertical CQRS slice:
//! - `commands/` - Write operations (upload, delete)
//! - `queries/` - Read operations (get, list)
//! - `routes.rs` - HTTP route definitions
//!
//! # Features
//!
//! - **batches**: archive upload, batch listing, retrieval and cascade delete
//! - **records**: read-only access to stored records
//!
//! Commands and queries implement the mediator pattern using the `mediator` crate.

pub mod batches;
pub mod records;
pub mod shared;

use axum::Router;
use sqlx::SqlitePool;

use crate::config::IngestConfig;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Store connection pool
    pub db: SqlitePool,
    /// Ingestion settings used by upload and delete
    pub ingest: IngestConfig,
}

/// Creates the API router with all feature routes mounted
///
/// - `/batches` - Upload, list, get and delete batches
/// - `/records` - Read records
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest(
            "/batches",
            batches::batches_routes(state.ingest.max_upload_bytes).with_state(state.clone()),
        )
        .nest("/records", records::records_routes().with_state(state.db.clone()))
}
