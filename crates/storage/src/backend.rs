//! Session store selection with enum dispatch.

use std::path::Path;

use async_trait::async_trait;
use mission_chat_core::ChatTurn;

use crate::error::StorageError;
use crate::memory::InMemorySessionStore;
use crate::sqlite_sessions::SqliteSessionStore;
use crate::traits::SessionStore;

macro_rules! dispatch {
    ($self:expr, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            SessionBackend::Memory(s) => <InMemorySessionStore as SessionStore>::$method(s, $($arg),*).await,
            SessionBackend::Sqlite(s) => <SqliteSessionStore as SessionStore>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Debug)]
pub enum SessionBackend {
    Memory(InMemorySessionStore),
    Sqlite(SqliteSessionStore),
}

impl SessionBackend {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::Memory(InMemorySessionStore::new())
    }

    pub fn sqlite(db_path: &Path) -> Result<Self, StorageError> {
        Ok(Self::Sqlite(SqliteSessionStore::new(db_path)?))
    }

    /// Persistent store when a path is configured, in-memory otherwise.
    pub fn from_path(db_path: Option<&Path>) -> Result<Self, StorageError> {
        match db_path {
            Some(path) => {
                tracing::info!("Persisting chat sessions to {}", path.display());
                Self::sqlite(path)
            },
            None => {
                tracing::info!("MISSION_CHAT_SESSION_DB not set, keeping chat sessions in memory");
                Ok(Self::in_memory())
            },
        }
    }
}

#[async_trait]
impl SessionStore for SessionBackend {
    async fn get(&self, session_id: &str) -> Result<Vec<ChatTurn>, StorageError> {
        dispatch!(self, get(session_id))
    }

    async fn append(&self, session_id: &str, turn: ChatTurn) -> Result<(), StorageError> {
        dispatch!(self, append(session_id, turn))
    }

    async fn append_all(&self, session_id: &str, turns: Vec<ChatTurn>) -> Result<(), StorageError> {
        dispatch!(self, append_all(session_id, turns))
    }

    async fn clear(&self, session_id: &str) -> Result<usize, StorageError> {
        dispatch!(self, clear(session_id))
    }
}
