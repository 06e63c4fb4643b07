//! Record rows decoded from an uploaded table

use serde::{Deserialize, Serialize};
use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

/// Rows per multi-row INSERT. Seven binds per row keeps a statement well
/// under SQLite's 999 host-parameter limit.
const RECORDS_PER_STATEMENT: usize = 100;

const RECORD_COLUMNS: &str =
    "id, pdf_name, first_name, last_name, age, address, national_id, batch_id";

/// A persisted record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Record {
    pub id: i64,
    pub pdf_name: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub address: String,
    pub national_id: String,
    pub batch_id: i64,
}

/// A record ready to be written under an existing batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub pdf_name: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub address: String,
    pub national_id: String,
    pub batch_id: i64,
}

/// Insert records in bulk. Either every row is written or none is: the
/// chunks run inside a transaction, nested as a savepoint when the caller
/// already holds one.
pub async fn create_records(
    conn: &mut SqliteConnection,
    records: &[NewRecord],
) -> Result<u64, sqlx::Error> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut tx = conn.begin().await?;
    let mut inserted = 0u64;

    for chunk in records.chunks(RECORDS_PER_STATEMENT) {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO records (pdf_name, first_name, last_name, age, address, national_id, batch_id) ",
        );
        builder.push_values(chunk, |mut row, record| {
            row.push_bind(record.pdf_name.clone())
                .push_bind(record.first_name.clone())
                .push_bind(record.last_name.clone())
                .push_bind(record.age)
                .push_bind(record.address.clone())
                .push_bind(record.national_id.clone())
                .push_bind(record.batch_id);
        });

        inserted += builder.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;

    tracing::debug!(count = inserted, "Records inserted");
    Ok(inserted)
}

/// All records, newest first
pub async fn list_records(pool: &SqlitePool) -> Result<Vec<Record>, sqlx::Error> {
    sqlx::query_as::<_, Record>(&format!(
        "SELECT {} FROM records ORDER BY id DESC",
        RECORD_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

pub async fn get_record(pool: &SqlitePool, id: i64) -> Result<Option<Record>, sqlx::Error> {
    sqlx::query_as::<_, Record>(&format!("SELECT {} FROM records WHERE id = ?", RECORD_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Children of one batch in insertion order
pub async fn list_records_for_batch(
    conn: &mut SqliteConnection,
    batch_id: i64,
) -> Result<Vec<Record>, sqlx::Error> {
    sqlx::query_as::<_, Record>(&format!(
        "SELECT {} FROM records WHERE batch_id = ? ORDER BY id ASC",
        RECORD_COLUMNS
    ))
    .bind(batch_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn count_records_for_batch(
    conn: &mut SqliteConnection,
    batch_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM records WHERE batch_id = ?")
        .bind(batch_id)
        .fetch_one(&mut *conn)
        .await
}

pub(crate) async fn delete_records_for_batch(
    conn: &mut SqliteConnection,
    batch_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM records WHERE batch_id = ?")
        .bind(batch_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
