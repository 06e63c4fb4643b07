use docbatch_common::FailureKind;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::{batches, BatchWithRecords};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBatchQuery {
    pub id: i64,
}

/// The batch fields flattened next to its `records`
pub type GetBatchResponse = BatchWithRecords;

#[derive(Debug, thiserror::Error)]
pub enum GetBatchError {
    #[error("Batch {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

impl GetBatchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GetBatchError::NotFound(_) => FailureKind::NotFound,
            GetBatchError::Database(_) => FailureKind::PersistenceFailure,
        }
    }
}

impl Request<Result<GetBatchResponse, GetBatchError>> for GetBatchQuery {}

impl crate::cqrs::middleware::Query for GetBatchQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: SqlitePool, query: GetBatchQuery) -> Result<GetBatchResponse, GetBatchError> {
    batches::get_batch_with_records(&pool, query.id)
        .await?
        .ok_or(GetBatchError::NotFound(query.id))
}
