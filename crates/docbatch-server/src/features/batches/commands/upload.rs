use docbatch_common::FailureKind;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::config::IngestConfig;
use crate::ingest::{IngestCoordinator, IngestError, IngestSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadBatchCommand {
    /// Original filename of the upload, stored as the batch display name
    pub file_name: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

pub type UploadBatchResponse = IngestSummary;

#[derive(Debug, thiserror::Error)]
pub enum UploadBatchError {
    #[error("Multipart field 'file' is required")]
    FileRequired,
    #[error("Only one multipart field 'file' is allowed")]
    DuplicateFile,
    #[error("Failed to read multipart body: {0}")]
    Multipart(String),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl UploadBatchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            UploadBatchError::FileRequired
            | UploadBatchError::DuplicateFile
            | UploadBatchError::Multipart(_) => {
                FailureKind::ValidationRejection
            },
            UploadBatchError::Ingest(e) => e.kind(),
        }
    }
}

impl Request<Result<UploadBatchResponse, UploadBatchError>> for UploadBatchCommand {}

impl crate::cqrs::middleware::Command for UploadBatchCommand {}

#[tracing::instrument(
    skip(pool, config, command),
    fields(file_name = %command.file_name, size = command.content.len())
)]
pub async fn handle(
    pool: SqlitePool,
    config: IngestConfig,
    command: UploadBatchCommand,
) -> Result<UploadBatchResponse, UploadBatchError> {
    let coordinator = IngestCoordinator::new(pool, config);
    Ok(coordinator.ingest(&command.file_name, command.content).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::features::shared::test_helpers::zip_archive;

    #[tokio::test]
    async fn test_handle_ingests_archive() {
        let pool = create_memory_pool().await.unwrap();
        let command = UploadBatchCommand {
            file_name: "upload.zip".to_string(),
            content: zip_archive(&[("data.csv", "FirstName;Age\nAnn;30\n")]),
        };

        let response = handle(pool, IngestConfig::default(), command).await.unwrap();
        assert_eq!(response.display_name, "upload.zip");
        assert_eq!(response.total_records, 1);
    }

    #[tokio::test]
    async fn test_handle_empty_content_is_validation_error() {
        let pool = create_memory_pool().await.unwrap();
        let command = UploadBatchCommand {
            file_name: "empty.zip".to_string(),
            content: Vec::new(),
        };

        let err = handle(pool, IngestConfig::default(), command).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::ValidationRejection);
    }

    #[tokio::test]
    async fn test_handle_empty_file_name_is_persistence_failure() {
        let pool = create_memory_pool().await.unwrap();
        let command = UploadBatchCommand {
            file_name: String::new(),
            content: zip_archive(&[("data.csv", "FirstName\nAnn\n")]),
        };

        let err = handle(pool, IngestConfig::default(), command).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::PersistenceFailure);
    }

    #[test]
    fn test_missing_file_is_validation_error() {
        assert_eq!(UploadBatchError::FileRequired.kind(), FailureKind::ValidationRejection);
    }
}
