//! SQLite-backed session store, so chat history survives restarts.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use mission_chat_core::{ChatTurn, Role, Row};
use rusqlite::{Connection, params};

use crate::blocking;
use crate::error::StorageError;
use crate::migrations;
use crate::traits::SessionStore;

#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
}

fn lock_conn(mutex: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, StorageError> {
    mutex.lock().map_err(|_| StorageError::LockPoisoned)
}

impl SqliteSessionStore {
    pub fn new(db_path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Self::init(conn)
    }

    /// Store backed by a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    pub fn get_history(&self, session_id: &str) -> Result<Vec<ChatTurn>, StorageError> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT role, content, columns_json, rows_json FROM chat_turns
             WHERE session_id = ?1 ORDER BY seq ASC",
        )?;
        let raw = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(role, content, columns, rows)| decode_turn(&role, content, columns, rows))
            .collect()
    }

    pub fn append_turns(&self, session_id: &str, turns: &[ChatTurn]) -> Result<(), StorageError> {
        let mut conn = lock_conn(&self.conn)?;
        let tx = conn.transaction()?;
        ensure_session(&tx, session_id)?;

        let last_seq: i64 = tx.query_row(
            "SELECT COALESCE(MAX(seq), 0) FROM chat_turns WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        let now = Utc::now().to_rfc3339();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO chat_turns (session_id, seq, role, content, columns_json, rows_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            let mut seq = last_seq;
            for turn in turns {
                seq = seq.saturating_add(1);
                let columns = turn.columns().map(serde_json::to_string).transpose()?;
                let rows = turn.rows().map(serde_json::to_string).transpose()?;
                stmt.execute(params![
                    session_id,
                    seq,
                    turn.role().as_str(),
                    turn.content(),
                    columns,
                    rows,
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn clear_history(&self, session_id: &str) -> Result<usize, StorageError> {
        let conn = lock_conn(&self.conn)?;
        let removed = conn.execute("DELETE FROM chat_turns WHERE session_id = ?1", params![session_id])?;
        Ok(removed)
    }

    #[cfg(test)]
    pub(crate) fn session_exists(&self, session_id: &str) -> Result<bool, StorageError> {
        use rusqlite::OptionalExtension;

        let conn = lock_conn(&self.conn)?;
        let found = conn
            .query_row("SELECT 1 FROM chat_sessions WHERE id = ?1", params![session_id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }
}

/// Creates the session row on first write.
fn ensure_session(conn: &Connection, session_id: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR IGNORE INTO chat_sessions (id, created_at) VALUES (?1, ?2)",
        params![session_id, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn decode_turn(
    role: &str,
    content: String,
    columns: Option<String>,
    rows: Option<String>,
) -> Result<ChatTurn, StorageError> {
    let role: Role = role.parse().map_err(|e: String| StorageError::DataCorruption {
        context: format!("chat turn role '{role}'"),
        source: e.into(),
    })?;
    let columns: Option<Vec<String>> = columns.as_deref().map(serde_json::from_str).transpose()?;
    let rows: Option<Vec<Row>> = rows.as_deref().map(serde_json::from_str).transpose()?;
    Ok(ChatTurn::from_parts(role, content, columns, rows))
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, session_id: &str) -> Result<Vec<ChatTurn>, StorageError> {
        let store = self.clone();
        let session_id = session_id.to_owned();
        blocking(move || store.get_history(&session_id)).await
    }

    async fn append(&self, session_id: &str, turn: ChatTurn) -> Result<(), StorageError> {
        let store = self.clone();
        let session_id = session_id.to_owned();
        blocking(move || store.append_turns(&session_id, &[turn])).await
    }

    async fn append_all(&self, session_id: &str, turns: Vec<ChatTurn>) -> Result<(), StorageError> {
        let store = self.clone();
        let session_id = session_id.to_owned();
        blocking(move || store.append_turns(&session_id, &turns)).await
    }

    async fn clear(&self, session_id: &str) -> Result<usize, StorageError> {
        let store = self.clone();
        let session_id = session_id.to_owned();
        blocking(move || store.clear_history(&session_id)).await
    }
}
