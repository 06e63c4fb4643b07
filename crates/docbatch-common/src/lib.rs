//! Docbatch Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error taxonomy and logging setup for the docbatch workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the failure taxonomy every boundary maps onto, plus the
//!   crate-level error type used for configuration parsing
//! - **Logging**: tracing subscriber configuration (console, file, JSON)
//!
//! # Example
//!
//! ```no_run
//! use docbatch_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("Logging ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{DocbatchError, FailureKind, Result};
