//! Read-only query execution over the mission dataset.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mission_chat_core::{ResultSet, Row, SchemaDescriptor};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode, OpenFlags};
use serde_json::Value;

use crate::blocking;
use crate::error::StorageError;
use crate::traits::QueryExecutor;

/// VM instructions between deadline checks.
const PROGRESS_OPS: i32 = 1_000;

/// The SQLite file holding the fixed single-table dataset.
///
/// Every call opens its own read-only connection; the connection is dropped
/// on every exit path, including timeouts.
#[derive(Debug, Clone)]
pub struct MissionDataset {
    path: PathBuf,
    query_timeout: Duration,
}

/// What the dataset file actually contains, compared to the expected schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub table_exists: bool,
    pub missing_columns: Vec<String>,
    pub row_count: u64,
}

impl SchemaReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.table_exists && self.missing_columns.is_empty()
    }
}

impl MissionDataset {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, query_timeout: Duration) -> Self {
        Self { path: path.into(), query_timeout }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_read_only(path: &Path) -> Result<Connection, StorageError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        conn.pragma_update(None, "query_only", true)?;
        Ok(conn)
    }

    /// Compares the on-disk table with `schema`.
    pub fn inspect(&self, schema: &SchemaDescriptor) -> Result<SchemaReport, StorageError> {
        let conn = Self::open_read_only(&self.path)?;
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(schema.table)))?;
        let present: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if present.is_empty() {
            return Ok(SchemaReport {
                table_exists: false,
                missing_columns: schema.column_names().map(ToOwned::to_owned).collect(),
                row_count: 0,
            });
        }

        let missing_columns = schema
            .column_names()
            .filter(|expected| !present.iter().any(|p| p.eq_ignore_ascii_case(expected)))
            .map(ToOwned::to_owned)
            .collect();
        let row_count: u64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(schema.table)),
            [],
            |row| row.get(0),
        )?;

        Ok(SchemaReport { table_exists: true, missing_columns, row_count })
    }
}

#[async_trait]
impl QueryExecutor for MissionDataset {
    async fn execute(&self, sql: &str) -> Result<ResultSet, StorageError> {
        let path = self.path.clone();
        let conn = blocking(move || Self::open_read_only(&path)).await?;
        let interrupt = conn.get_interrupt_handle();

        tracing::info!(sql, path = %self.path.display(), "executing query");
        let sql = sql.to_owned();
        let timeout = self.query_timeout;
        let deadline = Instant::now().checked_add(timeout);
        let task = tokio::task::spawn_blocking(move || run_query_until(&conn, &sql, deadline, timeout));

        match tokio::time::timeout(self.query_timeout, task).await {
            Ok(joined) => {
                let results = joined??;
                tracing::info!(rows = results.row_count(), "query executed successfully");
                Ok(results)
            },
            Err(_) => {
                // The blocking task observes the interrupt, errors out and drops the connection.
                interrupt.interrupt();
                tracing::warn!(timeout = ?self.query_timeout, "query timed out, interrupted");
                Err(StorageError::Timeout(self.query_timeout))
            },
        }
    }
}

/// Runs `sql`, aborting once `deadline` passes even if the statement only
/// starts after it.
pub(crate) fn run_query_until(
    conn: &Connection,
    sql: &str,
    deadline: Option<Instant>,
    timeout: Duration,
) -> Result<ResultSet, StorageError> {
    let Some(deadline) = deadline else {
        return run_query(conn, sql);
    };
    conn.progress_handler(PROGRESS_OPS, Some(move || Instant::now() >= deadline));
    let result = run_query(conn, sql);
    conn.progress_handler(PROGRESS_OPS, None::<fn() -> bool>);
    match result {
        Err(StorageError::Query(rusqlite::Error::SqliteFailure(e, _)))
            if e.code == ErrorCode::OperationInterrupted =>
        {
            Err(StorageError::Timeout(timeout))
        },
        other => other,
    }
}

fn run_query(conn: &Connection, sql: &str) -> Result<ResultSet, StorageError> {
    let mut stmt = conn.prepare(sql).map_err(StorageError::Query)?;
    let columns = unique_column_names(&stmt.column_names());

    let mut out = Vec::new();
    let mut rows = stmt.query([]).map_err(StorageError::Query)?;
    while let Some(row) = rows.next().map_err(StorageError::Query)? {
        let mut record = Row::new();
        for (idx, name) in columns.iter().enumerate() {
            let value = row.get_ref(idx).map_err(StorageError::Query)?;
            record.insert(name.clone(), to_json(value));
        }
        out.push(record);
    }

    Ok(ResultSet::new(columns, out))
}

/// Repeated names get a `_2`, `_3`... suffix so row keys stay one-to-one with columns.
fn unique_column_names(names: &[&str]) -> Vec<String> {
    let mut used = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = (*name).to_owned();
        let mut n = 1u32;
        while !used.insert(candidate.clone()) {
            n = n.saturating_add(1);
            candidate = format!("{name}_{n}");
        }
        out.push(candidate);
    }
    out
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        },
    }
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_column_names_suffixes_repeats() {
        assert_eq!(
            unique_column_names(&["LOCATION", "LOCATION", "LOCATION_2", "DATE"]),
            vec!["LOCATION", "LOCATION_2", "LOCATION_2_2", "DATE"]
        );
    }

    #[test]
    fn test_to_json_maps_sqlite_types() {
        assert_eq!(to_json(ValueRef::Null), Value::Null);
        assert_eq!(to_json(ValueRef::Integer(7)), serde_json::json!(7));
        assert_eq!(to_json(ValueRef::Real(1.5)), serde_json::json!(1.5));
        assert_eq!(to_json(ValueRef::Text(b"SpaceX")), serde_json::json!("SpaceX"));
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("MISSIONS"), "\"MISSIONS\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
