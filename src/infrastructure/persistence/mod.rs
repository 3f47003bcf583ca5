//! Durable alias stores.

mod null_store;
mod sqlite_store;

pub use null_store::NullStore;
pub use sqlite_store::SqliteStore;
