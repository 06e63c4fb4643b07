//! Upload batches and their cascade delete

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use std::time::Duration;

use super::records::{self, Record};
use crate::config::WriteMode;

/// A persisted batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Batch {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub display_name: String,
}

/// A batch before the store has assigned its id
#[derive(Debug, Clone)]
pub struct NewBatch {
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl NewBatch {
    /// Stamp a new batch with the current UTC time
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A batch with its records in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchWithRecords {
    #[serde(flatten)]
    pub batch: Batch,
    pub records: Vec<Record>,
}

/// Outcome of a cascade delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedBatch {
    pub display_name: String,
    pub deleted_records: u64,
}

pub async fn create_batch(conn: &mut SqliteConnection, batch: &NewBatch) -> Result<i64, sqlx::Error> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO batches (created_at, display_name) VALUES (?, ?) RETURNING id",
    )
    .bind(batch.created_at)
    .bind(&batch.display_name)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(batch_id = id, display_name = %batch.display_name, "Batch created");
    Ok(id)
}

/// All batches, newest first
pub async fn list_batches(pool: &SqlitePool) -> Result<Vec<Batch>, sqlx::Error> {
    sqlx::query_as::<_, Batch>(
        "SELECT id, created_at, display_name FROM batches ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await
}

async fn find_batch(conn: &mut SqliteConnection, id: i64) -> Result<Option<Batch>, sqlx::Error> {
    sqlx::query_as::<_, Batch>("SELECT id, created_at, display_name FROM batches WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Load a batch and its records from one consistent snapshot.
pub async fn get_batch_with_records(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<BatchWithRecords>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(batch) = find_batch(&mut tx, id).await? else {
        tx.commit().await?;
        return Ok(None);
    };
    let records = records::list_records_for_batch(&mut tx, id).await?;

    tx.commit().await?;
    Ok(Some(BatchWithRecords { batch, records }))
}

/// Delete a batch and every record under it.
///
/// Children go first because the foreign key has no cascade. With
/// [`WriteMode::TwoPhase`] each statement commits on its own, so a failure
/// between them leaves the batch without its records.
pub async fn delete_batch_cascade(
    pool: &SqlitePool,
    id: i64,
    mode: WriteMode,
) -> Result<Option<DeletedBatch>, sqlx::Error> {
    match mode {
        WriteMode::Transactional => {
            let mut tx = pool.begin().await?;
            let deleted = delete_in(&mut tx, id).await?;
            tx.commit().await?;
            Ok(deleted)
        },
        WriteMode::TwoPhase => {
            let mut conn = pool.acquire().await?;
            delete_in(&mut conn, id).await
        },
    }
}

async fn delete_in(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<DeletedBatch>, sqlx::Error> {
    let Some(batch) = find_batch(conn, id).await? else {
        return Ok(None);
    };

    let expected = records::count_records_for_batch(conn, id).await?;
    let deleted_records = records::delete_records_for_batch(conn, id).await?;
    if deleted_records != expected as u64 {
        tracing::warn!(
            batch_id = id,
            expected,
            deleted_records,
            "Record count changed during delete"
        );
    }

    sqlx::query("DELETE FROM batches WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(Some(DeletedBatch {
        display_name: batch.display_name,
        deleted_records,
    }))
}

/// Delete childless batches created before `now - grace`. Returns how many
/// were removed.
pub async fn reap_orphan_batches(pool: &SqlitePool, grace: Duration) -> Result<u64, sqlx::Error> {
    let Some(cutoff) = TimeDelta::from_std(grace)
        .ok()
        .and_then(|grace| Utc::now().checked_sub_signed(grace))
    else {
        return Ok(0);
    };

    let result = sqlx::query(
        r#"
        DELETE FROM batches
        WHERE created_at < ?
          AND NOT EXISTS (SELECT 1 FROM records WHERE records.batch_id = batches.id)
        "#,
    )
    .bind(cutoff)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, records::create_records, NewRecord};

    async fn seed(pool: &SqlitePool, name: &str, children: usize) -> i64 {
        let mut conn = pool.acquire().await.unwrap();
        let id = create_batch(&mut conn, &NewBatch::new(name)).await.unwrap();
        let records: Vec<NewRecord> = (0..children)
            .map(|i| NewRecord {
                pdf_name: format!("doc{}.pdf", i),
                first_name: format!("First{}", i),
                last_name: "Last".to_string(),
                age: 20 + i as i32,
                address: String::new(),
                national_id: String::new(),
                batch_id: id,
            })
            .collect();
        create_records(&mut conn, &records).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_create_batch_rejects_empty_display_name() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let result = create_batch(&mut conn, &NewBatch::new("")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_batches_newest_first() {
        let pool = create_memory_pool().await.unwrap();
        let first = seed(&pool, "first.zip", 0).await;
        let second = seed(&pool, "second.zip", 1).await;

        let listed = list_batches(&pool).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
    }

    #[tokio::test]
    async fn test_get_batch_with_records_is_repeatable() {
        let pool = create_memory_pool().await.unwrap();
        let id = seed(&pool, "three.zip", 3).await;

        let first = get_batch_with_records(&pool, id).await.unwrap().unwrap();
        let second = get_batch_with_records(&pool, id).await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.batch.display_name, "three.zip");
        assert_eq!(first.records.len(), 3);
        assert!(first.records.windows(2).all(|w| w[0].id < w[1].id));
        assert!(first.records.iter().all(|r| r.batch_id == id));

        assert!(get_batch_with_records(&pool, id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_cascade_in_both_modes() {
        for mode in [WriteMode::Transactional, WriteMode::TwoPhase] {
            let pool = create_memory_pool().await.unwrap();
            let id = seed(&pool, "gone.zip", 4).await;
            let keep = seed(&pool, "kept.zip", 2).await;

            let deleted = delete_batch_cascade(&pool, id, mode).await.unwrap().unwrap();
            assert_eq!(deleted.display_name, "gone.zip");
            assert_eq!(deleted.deleted_records, 4);

            assert!(get_batch_with_records(&pool, id).await.unwrap().is_none());
            let remaining = records::list_records(&pool).await.unwrap();
            assert_eq!(remaining.len(), 2);
            assert!(remaining.iter().all(|r| r.batch_id == keep));
        }
    }

    #[tokio::test]
    async fn test_delete_missing_batch_is_none() {
        let pool = create_memory_pool().await.unwrap();
        let id = seed(&pool, "stays.zip", 1).await;

        let result = delete_batch_cascade(&pool, id + 100, WriteMode::Transactional)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(list_batches(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reap_orphan_batches_respects_grace() {
        let pool = create_memory_pool().await.unwrap();
        let with_children = seed(&pool, "full.zip", 2).await;
        let orphan = seed(&pool, "empty.zip", 0).await;

        assert_eq!(reap_orphan_batches(&pool, Duration::from_secs(3600)).await.unwrap(), 0);

        // Backdate the orphan past the grace period.
        sqlx::query("UPDATE batches SET created_at = ? WHERE id = ?")
            .bind(Utc::now() - TimeDelta::hours(2))
            .bind(orphan)
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(reap_orphan_batches(&pool, Duration::from_secs(3600)).await.unwrap(), 1);
        let remaining = list_batches(&pool).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, with_children);
    }
}
