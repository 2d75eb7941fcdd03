//! Persistence layer — key-value storage for the baseline record.

pub mod keys;
pub mod libsql_backend;
pub mod memory;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use memory::MemoryStorage;
pub use traits::{Storage, read_json, write_json};
