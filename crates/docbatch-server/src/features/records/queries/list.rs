use docbatch_common::FailureKind;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::{records, Record};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRecordsQuery {}

pub type ListRecordsResponse = Vec<Record>;

#[derive(Debug, thiserror::Error)]
pub enum ListRecordsError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

impl ListRecordsError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::PersistenceFailure
    }
}

impl Request<Result<ListRecordsResponse, ListRecordsError>> for ListRecordsQuery {}

impl crate::cqrs::middleware::Query for ListRecordsQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: SqlitePool,
    _query: ListRecordsQuery,
) -> Result<ListRecordsResponse, ListRecordsError> {
    Ok(records::list_records(&pool).await?)
}
