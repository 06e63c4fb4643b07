use docbatch_common::FailureKind;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::{records, Record};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRecordQuery {
    pub id: i64,
}

pub type GetRecordResponse = Record;

#[derive(Debug, thiserror::Error)]
pub enum GetRecordError {
    #[error("Record {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

impl GetRecordError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GetRecordError::NotFound(_) => FailureKind::NotFound,
            GetRecordError::Database(_) => FailureKind::PersistenceFailure,
        }
    }
}

impl Request<Result<GetRecordResponse, GetRecordError>> for GetRecordQuery {}

impl crate::cqrs::middleware::Query for GetRecordQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: SqlitePool, query: GetRecordQuery) -> Result<GetRecordResponse, GetRecordError> {
    records::get_record(&pool, query.id)
        .await?
        .ok_or(GetRecordError::NotFound(query.id))
}
