//! Integration tests for the mediator registry
//!
//! Every command and query is dispatched through the mediator rather than by
//! calling its handler directly. Handler registration blocks in place, so the
//! tests need the multi-threaded runtime.

use docbatch_server::config::WriteMode;
use docbatch_server::cqrs::build_mediator;
use docbatch_server::features::batches::{
    DeleteBatchCommand, DeleteBatchError, GetBatchError, GetBatchQuery, ListBatchesQuery,
    UploadBatchCommand, UploadBatchError,
};
use docbatch_server::features::records::{GetRecordError, GetRecordQuery, ListRecordsQuery};
use mediator::AsyncMediator;

mod helpers;
use helpers::{setup_test_db, test_config, zip_archive, SAMPLE_TABLE};

#[tokio::test(flavor = "multi_thread")]
async fn test_commands_and_queries_dispatch_through_mediator() {
    let pool = setup_test_db().await;
    let config = test_config(WriteMode::Transactional);
    let mut mediator = build_mediator(pool, config.ingest);

    let summary = mediator
        .send(UploadBatchCommand {
            file_name: "batch1.zip".to_string(),
            content: zip_archive(&[("data.csv", SAMPLE_TABLE)]),
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.display_name, "batch1.zip");
    assert_eq!(summary.total_records, 2);

    let batches = mediator.send(ListBatchesQuery {}).await.unwrap().unwrap();
    assert_eq!(batches.len(), 1);
    let batch_id = batches[0].id;

    let batch = mediator
        .send(GetBatchQuery { id: batch_id })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.records[1].age, 0);

    let records = mediator.send(ListRecordsQuery {}).await.unwrap().unwrap();
    assert_eq!(records.len(), 2);

    let record = mediator
        .send(GetRecordQuery { id: records[0].id })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.batch_id, batch_id);

    let deleted = mediator
        .send(DeleteBatchCommand { id: batch_id })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deleted.display_name, "batch1.zip");
    assert_eq!(deleted.deleted_records, 2);

    assert!(mediator.send(ListBatchesQuery {}).await.unwrap().unwrap().is_empty());
    assert!(mediator.send(ListRecordsQuery {}).await.unwrap().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_mediator_returns_handler_errors() {
    let pool = setup_test_db().await;
    let mut mediator = build_mediator(pool, test_config(WriteMode::TwoPhase).ingest);

    let missing_batch = mediator.send(GetBatchQuery { id: 41 }).await.unwrap();
    assert!(matches!(missing_batch, Err(GetBatchError::NotFound(41))));

    let missing_record = mediator.send(GetRecordQuery { id: 42 }).await.unwrap();
    assert!(matches!(missing_record, Err(GetRecordError::NotFound(42))));

    let delete = mediator.send(DeleteBatchCommand { id: 43 }).await.unwrap();
    assert!(matches!(delete, Err(DeleteBatchError::NotFound(43))));

    let upload = mediator
        .send(UploadBatchCommand {
            file_name: "notes.zip".to_string(),
            content: zip_archive(&[("notes.txt", "not a table")]),
        })
        .await
        .unwrap();
    assert!(matches!(upload, Err(UploadBatchError::Ingest(_))));
}
