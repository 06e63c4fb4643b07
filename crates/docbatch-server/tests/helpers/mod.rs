//! Test helpers for docbatch server integration tests
//!
//! - In-memory store setup with migrations applied
//! - Router construction with per-test configuration
//! - ZIP and multipart request builders
//! - Response decoding

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use docbatch_server::{
    api,
    config::{Config, WriteMode},
    db,
};
use serde_json::Value;
use sqlx::SqlitePool;
use std::io::{Cursor, Write};
use tower::ServiceExt; // for `oneshot`
use zip::{write::SimpleFileOptions, ZipWriter};

const BOUNDARY: &str = "docbatch-test-boundary";

/// The two-row table used across the upload scenarios
pub const SAMPLE_TABLE: &str = "PdfName;FirstName;LastName;Age;Address;SSN\n\
                                a.pdf;Ann;Lee;34;1 Main St;111-22-3333\n\
                                b.pdf;Bob;Ray;;2 Side Rd;444-55-6666\n";

/// Fresh single-connection in-memory store
pub async fn setup_test_db() -> SqlitePool {
    db::create_memory_pool()
        .await
        .expect("Failed to create in-memory store")
}

pub fn test_config(write_mode: WriteMode) -> Config {
    let mut config = Config::default();
    config.ingest.write_mode = write_mode;
    config
}

pub fn setup_test_app(pool: SqlitePool, config: &Config) -> Router {
    api::create_router(pool, config)
}

/// Build an in-memory ZIP archive from `(name, content)` pairs
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("Failed to start zip entry");
        writer
            .write_all(content.as_bytes())
            .expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish zip").into_inner()
}

/// `POST /api/v1/batches` with `content` in a multipart field named `field`
pub fn multipart_upload(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    multipart_upload_parts(&[(field, file_name, content)])
}

/// `POST /api/v1/batches` with one multipart part per `(field, file_name, content)`
pub fn multipart_upload_parts(parts: &[(&str, &str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (field, file_name, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/zip\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/v1/batches")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("Failed to build upload request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build GET request")
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build DELETE request")
}

/// Send one request and decode the JSON body
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router failed to respond");
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (status, json)
}
