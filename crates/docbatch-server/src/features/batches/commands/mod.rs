pub mod delete;
pub mod upload;

pub use delete::{DeleteBatchCommand, DeleteBatchError, DeleteBatchResponse};
pub use upload::{UploadBatchCommand, UploadBatchError, UploadBatchResponse};
