//! Upload ingestion
//!
//! Validates an uploaded archive, records a batch for it, decodes the target
//! entry and stores one record per row under that batch.

use docbatch_common::FailureKind;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;

use super::archive::{ArchiveError, ArchiveInspector, TargetEntry};
use super::table::{DecodedRow, TableDecoder, TableError};
use crate::config::{IngestConfig, WriteMode};
use crate::db::{batches, records, NewBatch, NewRecord};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Uploaded file is empty")]
    EmptyInput,

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("{0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Decode task failed: {0}")]
    DecodeTask(String),
}

impl IngestError {
    pub fn kind(&self) -> FailureKind {
        match self {
            IngestError::EmptyInput | IngestError::Archive(_) | IngestError::Table(_) => {
                FailureKind::ValidationRejection
            },
            IngestError::Persistence(_) | IngestError::DecodeTask(_) => {
                FailureKind::PersistenceFailure
            },
        }
    }
}

/// Result of a successful ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub display_name: String,
    pub total_records: u64,
}

#[derive(Debug, Clone)]
pub struct IngestCoordinator {
    pool: SqlitePool,
    config: IngestConfig,
}

impl IngestCoordinator {
    pub fn new(pool: SqlitePool, config: IngestConfig) -> Self {
        Self { pool, config }
    }

    /// Ingest one uploaded archive named `display_name`.
    ///
    /// Nothing is written unless the archive opens and holds a target entry.
    /// In [`WriteMode::Transactional`] the entry is decoded before the write
    /// transaction opens, so the store is not locked while rows are parsed.
    /// In [`WriteMode::TwoPhase`] the batch commits before decoding starts, so
    /// a later failure leaves it without records.
    #[tracing::instrument(
        skip(self, bytes),
        fields(size = bytes.len(), write_mode = %self.config.write_mode)
    )]
    pub async fn ingest(
        &self,
        display_name: &str,
        bytes: Vec<u8>,
    ) -> Result<IngestSummary, IngestError> {
        if bytes.is_empty() {
            return Err(IngestError::EmptyInput);
        }

        let mut inspector = ArchiveInspector::open(bytes)?;
        let entry = inspector.locate(&self.config.target_suffix)?;

        let total_records = match self.config.write_mode {
            WriteMode::Transactional => {
                let rows = decode_entry(inspector, entry, self.config.delimiter).await?;

                let mut tx = self.pool.begin().await?;
                let batch_id = batches::create_batch(&mut tx, &NewBatch::new(display_name)).await?;
                let total = store_rows(&mut tx, batch_id, rows).await?;
                tx.commit().await?;
                total
            },
            WriteMode::TwoPhase => {
                let mut conn = self.pool.acquire().await?;
                let batch_id =
                    batches::create_batch(&mut conn, &NewBatch::new(display_name)).await?;

                let rows = decode_entry(inspector, entry, self.config.delimiter).await?;
                store_rows(&mut conn, batch_id, rows).await?
            },
        };

        tracing::info!(total_records, "Batch ingested");

        Ok(IngestSummary {
            display_name: display_name.to_string(),
            total_records,
        })
    }
}

async fn store_rows(
    conn: &mut SqliteConnection,
    batch_id: i64,
    rows: Vec<DecodedRow>,
) -> Result<u64, IngestError> {
    if rows.is_empty() {
        tracing::info!(batch_id, "Target entry has no rows");
        return Ok(0);
    }

    let new_records: Vec<NewRecord> = rows
        .into_iter()
        .map(|row| build_record(row, batch_id))
        .collect();

    Ok(records::create_records(conn, &new_records).await?)
}

/// Decode the whole entry on the blocking pool. The inspector moves into the
/// task and is dropped there once every row has been read.
async fn decode_entry(
    mut inspector: ArchiveInspector,
    entry: TargetEntry,
    delimiter: u8,
) -> Result<Vec<DecodedRow>, IngestError> {
    tokio::task::spawn_blocking(move || -> Result<Vec<DecodedRow>, IngestError> {
        let reader = inspector.open_entry(&entry)?;
        let rows = TableDecoder::new(delimiter)
            .decode(reader)?
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(entry = %entry.name, rows = rows.len(), "Decoded target entry");
        Ok(rows)
    })
    .await
    .map_err(|e| IngestError::DecodeTask(e.to_string()))?
}

/// Missing text becomes `""`, a missing or unparsable age becomes `0`.
fn build_record(row: DecodedRow, batch_id: i64) -> NewRecord {
    NewRecord {
        pdf_name: row.pdf_name.unwrap_or_default(),
        first_name: row.first_name.unwrap_or_default(),
        last_name: row.last_name.unwrap_or_default(),
        age: row.age.unwrap_or_default(),
        address: row.address.unwrap_or_default(),
        national_id: row.national_id.unwrap_or_default(),
        batch_id,
    }
}
