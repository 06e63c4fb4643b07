pub use mediator::DefaultAsyncMediator;
use sqlx::SqlitePool;

use crate::config::IngestConfig;

pub mod middleware;

pub type AppMediator = DefaultAsyncMediator;

/// Register every command and query handler.
///
/// Registration blocks in place, so call this from a multi-threaded tokio
/// runtime.
pub fn build_mediator(pool: SqlitePool, ingest: IngestConfig) -> AppMediator {
    let write_mode = ingest.write_mode;

    DefaultAsyncMediator::builder()
        // Batches
        .add_handler({
            let pool = pool.clone();
            let ingest = ingest.clone();
            move |cmd| {
                let pool = pool.clone();
                let ingest = ingest.clone();
                async move { crate::features::batches::commands::upload::handle(pool, ingest, cmd).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |cmd| {
                let pool = pool.clone();
                async move {
                    crate::features::batches::commands::delete::handle(pool, write_mode, cmd).await
                }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::batches::queries::list::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::batches::queries::get::handle(pool, query).await }
            }
        })
        // Records
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::records::queries::list::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = pool.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::records::queries::get::handle(pool, query).await }
            }
        })
        .build()
}
