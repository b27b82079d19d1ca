//! One-shot CSV to SQLite dataset loader.

use std::collections::HashSet;
use std::path::Path;

use mission_chat_core::SchemaDescriptor;
use rusqlite::Connection;

use crate::dataset::quote_ident;
use crate::error::StorageError;

/// Loads `csv_path` into `schema.table` of `db_path`, replacing any existing table.
///
/// Every CSV column becomes a `TEXT` column; empty fields are stored as NULL.
/// Returns the number of rows written.
pub fn load_csv(
    csv_path: &Path,
    db_path: &Path,
    schema: &SchemaDescriptor,
) -> Result<usize, StorageError> {
    tracing::info!("Loading data from {}...", csv_path.display());
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(csv_path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_owned()).collect();

    let records = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(ToOwned::to_owned).collect::<Vec<_>>()))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!("Read {} rows from CSV", records.len());

    load_records(db_path, schema, &headers, &records)
}

/// Writes already-parsed records as the dataset table.
pub fn load_records(
    db_path: &Path,
    schema: &SchemaDescriptor,
    headers: &[String],
    records: &[Vec<String>],
) -> Result<usize, StorageError> {
    validate_headers(headers)?;
    for expected in schema.column_names() {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(expected)) {
            tracing::warn!(column = expected, "dataset is missing an expected column");
        }
    }

    let table = quote_ident(schema.table);
    let column_defs =
        headers.iter().map(|h| format!("{} TEXT", quote_ident(h))).collect::<Vec<_>>().join(", ");
    let column_names = headers.iter().map(|h| quote_ident(h)).collect::<Vec<_>>().join(", ");
    let placeholders = (1..=headers.len()).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ");

    let mut conn = Connection::open(db_path)?;
    let tx = conn.transaction()?;
    tx.execute_batch(&format!("DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({column_defs});"))?;
    {
        let mut stmt =
            tx.prepare(&format!("INSERT INTO {table} ({column_names}) VALUES ({placeholders})"))?;
        for (line, record) in records.iter().enumerate() {
            if record.len() != headers.len() {
                return Err(StorageError::InvalidDataset(format!(
                    "record {} has {} fields, expected {}",
                    line.saturating_add(1),
                    record.len(),
                    headers.len()
                )));
            }
            let values = record.iter().map(|v| if v.is_empty() { None } else { Some(v.as_str()) });
            stmt.execute(rusqlite::params_from_iter(values))?;
        }
    }
    tx.commit()?;

    tracing::info!(
        "Data successfully written to table '{}' in {}",
        schema.table,
        db_path.display()
    );
    Ok(records.len())
}

fn validate_headers(headers: &[String]) -> Result<(), StorageError> {
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(StorageError::InvalidDataset("CSV has no header row".to_owned()));
    }
    if let Some(blank) = headers.iter().position(String::is_empty) {
        return Err(StorageError::InvalidDataset(format!(
            "CSV header {} is blank",
            blank.saturating_add(1)
        )));
    }
    let mut seen = HashSet::new();
    for header in headers {
        if !seen.insert(header.to_ascii_uppercase()) {
            return Err(StorageError::InvalidDataset(format!("duplicate CSV header '{header}'")));
        }
    }
    Ok(())
}
