pub mod memory;
pub mod mysql;

pub use memory::InMemoryUrlStore;
pub use mysql::MySqlUrlStore;
pub use stubby_core::store::Result;
pub use stubby_core::{InsertOutcome, StorageError, UrlStore};
