//! Persistence adapters - Document stores implementing the outbound ports

mod in_memory;
mod sqlite_store;

pub use in_memory::InMemoryDocumentStore;
pub use sqlite_store::SqliteDocumentStore;
