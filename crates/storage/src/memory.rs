//! Process-local session store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use mission_chat_core::ChatTurn;

use crate::error::StorageError;
use crate::traits::SessionStore;

/// Histories keyed by session id, lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Vec<ChatTurn>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex.lock().map_err(|_| StorageError::LockPoisoned)
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with stored turns.
    #[cfg(test)]
    pub(crate) fn session_count(&self) -> Result<usize, StorageError> {
        Ok(lock(&self.sessions)?.len())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Vec<ChatTurn>, StorageError> {
        Ok(lock(&self.sessions)?.get(session_id).cloned().unwrap_or_default())
    }

    async fn append(&self, session_id: &str, turn: ChatTurn) -> Result<(), StorageError> {
        lock(&self.sessions)?.entry(session_id.to_owned()).or_default().push(turn);
        Ok(())
    }

    async fn append_all(&self, session_id: &str, turns: Vec<ChatTurn>) -> Result<(), StorageError> {
        lock(&self.sessions)?.entry(session_id.to_owned()).or_default().extend(turns);
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<usize, StorageError> {
        let mut sessions = lock(&self.sessions)?;
        Ok(sessions.get_mut(session_id).map_or(0, |history| std::mem::take(history).len()))
    }
}
