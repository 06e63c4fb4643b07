//! Docbatch Server Library
//!
//! HTTP service that ingests ZIP archives of delimited tables into batches of
//! records and serves them back.
//!
//! # Overview
//!
//! - **Ingestion**: an uploaded archive becomes one batch plus one record per
//!   table row
//! - **Retrieval**: batches with their records, records on their own
//! - **Cascade delete**: a batch and every record under it
//! - **Orphan sweep**: optional cleanup of childless batches
//!
//! # Architecture
//!
//! The server follows a **CQRS** layout. Commands (upload, delete) modify the
//! store; queries (list, get) only read it. Each feature slice under
//! [`features`] owns its commands, queries and routes, and every handler is
//! registered with the mediator in [`cqrs`].
//!
//! Data flow for an upload:
//!
//! ```text
//! bytes -> ingest::archive -> ingest::table -> ingest::coordinator -> db
//! ```
//!
//! ## Framework Stack
//!
//! - **Axum**: web framework
//! - **SQLx**: SQLite access and migrations
//! - **Tower**: middleware and service abstractions
//!
//! # Example
//!
//! ```no_run
//! use docbatch_server::{api, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&db::DbConfig::from(&config.database)).await?;
//!     db::run_migrations(&pool).await?;
//!     let app = api::create_router(pool, &config);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;

// Re-export commonly used types
pub use error::{AppError, AppResult};
