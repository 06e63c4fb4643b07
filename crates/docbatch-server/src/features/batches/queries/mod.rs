pub mod get;
pub mod list;

pub use get::{GetBatchError, GetBatchQuery, GetBatchResponse};
pub use list::{BatchListItem, ListBatchesError, ListBatchesQuery, ListBatchesResponse};
