pub mod count;

pub use count::{CountRecordsQuery, CountRecordsResponse};
