//! SQLite storage layer.
//!
//! Cache and sink implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod cache;
pub mod pool;
pub mod sink;

pub use cache::SqliteCache;
pub use pool::DatabasePool;
pub use sink::SqliteResultSink;
