use docbatch_common::FailureKind;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::config::WriteMode;
use crate::db::batches;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBatchCommand {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBatchResponse {
    pub display_name: String,
    pub deleted_records: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteBatchError {
    #[error("Batch {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

impl DeleteBatchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DeleteBatchError::NotFound(_) => FailureKind::NotFound,
            DeleteBatchError::Database(_) => FailureKind::PersistenceFailure,
        }
    }
}

impl Request<Result<DeleteBatchResponse, DeleteBatchError>> for DeleteBatchCommand {}

impl crate::cqrs::middleware::Command for DeleteBatchCommand {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: SqlitePool,
    write_mode: WriteMode,
    command: DeleteBatchCommand,
) -> Result<DeleteBatchResponse, DeleteBatchError> {
    let deleted = batches::delete_batch_cascade(&pool, command.id, write_mode)
        .await?
        .ok_or(DeleteBatchError::NotFound(command.id))?;

    tracing::info!(
        batch_id = command.id,
        deleted_records = deleted.deleted_records,
        "Batch deleted"
    );

    Ok(DeleteBatchResponse {
        display_name: deleted.display_name,
        deleted_records: deleted.deleted_records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, records};
    use crate::features::shared::test_helpers::TestBatch;

    #[tokio::test]
    async fn test_handle_deletes_batch_and_records() {
        let pool = create_memory_pool().await.unwrap();
        let batch = TestBatch::new("doomed.zip")
            .with_records(3)
            .insert(&pool)
            .await
            .unwrap();

        let response = handle(
            pool.clone(),
            WriteMode::Transactional,
            DeleteBatchCommand { id: batch.id },
        )
        .await
        .unwrap();

        assert_eq!(response.display_name, "doomed.zip");
        assert_eq!(response.deleted_records, 3);
        for record_id in &batch.record_ids {
            assert!(records::get_record(&pool, *record_id).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_handle_not_found() {
        let pool = create_memory_pool().await.unwrap();
        TestBatch::new("kept.zip").with_records(1).insert(&pool).await.unwrap();

        let result = handle(pool.clone(), WriteMode::TwoPhase, DeleteBatchCommand { id: 999 }).await;
        assert!(matches!(result, Err(DeleteBatchError::NotFound(999))));
        assert_eq!(records::list_records(&pool).await.unwrap().len(), 1);
    }
}
