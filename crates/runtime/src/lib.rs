pub mod context;
pub mod data_access;

pub use context::Context;
pub use data_access::{DataAccess, DataError, DataResult, EntityKind, Filter, Record, RecordKey};
