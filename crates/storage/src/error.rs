//! Typed error enum for the storage layer.
//!
//! Separates failures the SQL engine reports about a query (bad SQL, unknown
//! column, timeout) from infrastructure failures (join errors, poisoned locks,
//! I/O), so callers can tell a user-facing query problem from a server fault.

use std::time::Duration;

use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The engine rejected or failed the submitted query.
    #[error("{0}")]
    Query(#[source] rusqlite::Error),

    /// The query ran longer than the configured limit and was interrupted.
    #[error("query exceeded {0:?} and was interrupted")]
    Timeout(Duration),

    /// Opening, migrating or writing a database failed.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// Row data could not be (de)serialized.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The source file for a dataset load is unusable.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("blocking task failed: {0}")]
    TaskJoin(String),
}

impl StorageError {
    /// Whether the SQL engine reported the failure (bad query, timeout,
    /// unreadable database) as opposed to a fault in the server itself.
    #[must_use]
    pub const fn is_engine_error(&self) -> bool {
        matches!(self, Self::Query(_) | Self::Timeout(_) | Self::Database(_))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataCorruption {
            context: "JSON serialization/deserialization".to_owned(),
            source: Box::new(err),
        }
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}
