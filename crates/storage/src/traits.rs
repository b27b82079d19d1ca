//! Storage seams consumed by the service layer.

use async_trait::async_trait;
use mission_chat_core::{ChatTurn, ResultSet};

use crate::error::StorageError;

/// Runs one read-only statement against the dataset.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute `sql` and materialize the full result.
    async fn execute(&self, sql: &str) -> Result<ResultSet, StorageError>;
}

/// Per-session conversational history.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// History for `session_id`; an unknown id yields an empty history.
    async fn get(&self, session_id: &str) -> Result<Vec<ChatTurn>, StorageError>;

    /// Append one turn.
    async fn append(&self, session_id: &str, turn: ChatTurn) -> Result<(), StorageError>;

    /// Append several turns as one unit: either all are recorded or none.
    async fn append_all(&self, session_id: &str, turns: Vec<ChatTurn>) -> Result<(), StorageError>;

    /// Reset history to empty. Returns how many turns were removed.
    async fn clear(&self, session_id: &str) -> Result<usize, StorageError>;
}
