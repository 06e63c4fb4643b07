use chrono::{DateTime, Utc};
use docbatch_common::FailureKind;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::{batches, Batch};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListBatchesQuery {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchListItem {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub display_name: String,
}

impl From<Batch> for BatchListItem {
    fn from(batch: Batch) -> Self {
        Self {
            id: batch.id,
            created_at: batch.created_at,
            display_name: batch.display_name,
        }
    }
}

pub type ListBatchesResponse = Vec<BatchListItem>;

#[derive(Debug, thiserror::Error)]
pub enum ListBatchesError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

impl ListBatchesError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::PersistenceFailure
    }
}

impl Request<Result<ListBatchesResponse, ListBatchesError>> for ListBatchesQuery {}

impl crate::cqrs::middleware::Query for ListBatchesQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: SqlitePool,
    _query: ListBatchesQuery,
) -> Result<ListBatchesResponse, ListBatchesError> {
    let items = batches::list_batches(&pool)
        .await?
        .into_iter()
        .map(BatchListItem::from)
        .collect();
    Ok(items)
}
