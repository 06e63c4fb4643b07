pub mod queries;
pub mod routes;

pub use queries::{
    GetRecordError, GetRecordQuery, GetRecordResponse, ListRecordsError, ListRecordsQuery,
    ListRecordsResponse,
};

pub use routes::records_routes;
