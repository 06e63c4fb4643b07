//! Test helpers and fixtures for store tests
//!
//! ```rust,ignore
//! use docbatch_server::features::shared::test_helpers::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let pool = create_memory_pool().await.unwrap();
//!     let batch = TestBatch::new("batch1.zip")
//!         .with_records(3)
//!         .insert(&pool)
//!         .await
//!         .unwrap();
//!     // ... test logic ...
//! }
//! ```

use sqlx::SqlitePool;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::db::{batches, records, NewBatch, NewRecord};

/// Builder for creating test batches with generated records
#[derive(Debug, Clone)]
pub struct TestBatch {
    pub display_name: String,
    pub record_count: usize,
}

/// Ids assigned to an inserted test batch
#[derive(Debug, Clone)]
pub struct InsertedBatch {
    pub id: i64,
    pub record_ids: Vec<i64>,
}

impl TestBatch {
    /// Create a new test batch builder with no records
    pub fn new(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            record_count: 0,
        }
    }

    /// Generate `count` records under the batch
    pub fn with_records(mut self, count: usize) -> Self {
        self.record_count = count;
        self
    }

    /// Insert the batch and its records
    pub async fn insert(self, pool: &SqlitePool) -> sqlx::Result<InsertedBatch> {
        let mut conn = pool.acquire().await?;
        let id = batches::create_batch(&mut conn, &NewBatch::new(self.display_name)).await?;

        let new_records: Vec<NewRecord> = (0..self.record_count)
            .map(|i| NewRecord {
                pdf_name: format!("doc{}.pdf", i),
                first_name: format!("First{}", i),
                last_name: format!("Last{}", i),
                age: 30 + i as i32,
                address: format!("{} Test Street", i + 1),
                national_id: format!("000-00-{:04}", i),
                batch_id: id,
            })
            .collect();
        records::create_records(&mut conn, &new_records).await?;

        let record_ids = records::list_records_for_batch(&mut conn, id)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();

        Ok(InsertedBatch { id, record_ids })
    }
}

/// Build an in-memory ZIP archive from `(name, content)` pairs
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(content.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip archive").into_inner()
}
