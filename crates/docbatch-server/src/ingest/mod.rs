//! Upload ingestion pipeline
//!
//! - **archive**: opens the uploaded ZIP and locates the target entry
//! - **table**: decodes the delimited entry into optional-valued rows
//! - **coordinator**: creates the batch and its records
//! - **sweep**: optional background removal of orphan batches

pub mod archive;
pub mod coordinator;
pub mod sweep;
pub mod table;

pub use archive::{ArchiveError, ArchiveInspector, TargetEntry};
pub use coordinator::{IngestCoordinator, IngestError, IngestSummary};
pub use sweep::OrphanSweeper;
pub use table::{Column, DecodedRow, DecodedRows, TableDecoder, TableError};
