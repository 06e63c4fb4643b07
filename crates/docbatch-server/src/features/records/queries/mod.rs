pub mod get;
pub mod list;

pub use get::{GetRecordError, GetRecordQuery, GetRecordResponse};
pub use list::{ListRecordsError, ListRecordsQuery, ListRecordsResponse};
