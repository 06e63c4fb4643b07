//! Error types for docbatch

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for docbatch operations
pub type Result<T> = std::result::Result<T, DocbatchError>;

/// Main error type for docbatch
#[derive(Error, Debug)]
pub enum DocbatchError {
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DocbatchError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Observable outcome class of a failed ingestion, read or delete.
///
/// Every error surfaced at the HTTP boundary maps onto exactly one kind, so
/// callers can choose a response code without inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Client-supplied input was rejected (empty upload, missing target
    /// entry, corrupt archive, malformed table). Never retried.
    ValidationRejection,
    /// The requested id does not resolve.
    NotFound,
    /// The store failed: constraint violation, connectivity loss, etc.
    PersistenceFailure,
}

impl FailureKind {
    /// Stable machine-readable code used in error envelopes
    pub fn code(self) -> &'static str {
        match self {
            FailureKind::ValidationRejection => "VALIDATION_ERROR",
            FailureKind::NotFound => "NOT_FOUND",
            FailureKind::PersistenceFailure => "PERSISTENCE_ERROR",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ValidationRejection => write!(f, "validation rejection"),
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::PersistenceFailure => write!(f, "persistence failure"),
        }
    }
}
