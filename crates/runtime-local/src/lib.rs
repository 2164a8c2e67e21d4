mod data_access;

pub use data_access::InMemoryDataAccess;
