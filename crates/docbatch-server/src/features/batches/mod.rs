pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    DeleteBatchCommand, DeleteBatchError, DeleteBatchResponse, UploadBatchCommand,
    UploadBatchError, UploadBatchResponse,
};

pub use queries::{
    BatchListItem, GetBatchError, GetBatchQuery, GetBatchResponse, ListBatchesError,
    ListBatchesQuery, ListBatchesResponse,
};

pub use routes::batches_routes;
