//! Storage layer for mission-chat
//!
//! Read-only SQLite execution against the mission dataset, the CSV loader that
//! builds that dataset, and the chat session stores.

mod backend;
mod dataset;
pub mod error;
mod loader;
mod memory;
mod migrations;
mod sqlite_sessions;
#[cfg(test)]
mod tests;
pub mod traits;

pub use backend::SessionBackend;
pub use dataset::{MissionDataset, SchemaReport};
pub use error::StorageError;
pub use loader::{load_csv, load_records};
pub use memory::InMemorySessionStore;
pub use sqlite_sessions::SqliteSessionStore;
pub use traits::{QueryExecutor, SessionStore};

/// Helper: run a blocking closure on the tokio blocking pool.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}
