//! Session database migrations

use rusqlite::Connection;

pub const SCHEMA_VERSION: i32 = 1;

pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    tracing::info!(
        "Session database schema version: {} (target: {})",
        current_version,
        SCHEMA_VERSION
    );

    if current_version < 1 {
        tracing::info!("Running migration v1: chat sessions and turns");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chat_sessions (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chat_turns (
                session_id TEXT NOT NULL REFERENCES chat_sessions(id) ON DELETE CASCADE,
                seq INTEGER NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                columns_json TEXT,
                rows_json TEXT,
                created_at TEXT NOT NULL,
                PRIMARY KEY (session_id, seq)
            );
            "#,
        )?;
        conn.pragma_update(None, "user_version", 1)?;
    }

    Ok(())
}
