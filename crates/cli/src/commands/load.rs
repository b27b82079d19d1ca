use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mission_chat_core::{MISSIONS_SCHEMA, database_path_from_env};
use mission_chat_storage::load_csv;

pub(crate) fn run(csv: &Path, db: Option<PathBuf>) -> Result<()> {
    let db = db.unwrap_or_else(database_path_from_env);
    let rows = load_csv(csv, &db, &MISSIONS_SCHEMA)
        .with_context(|| format!("failed to load {} into {}", csv.display(), db.display()))?;
    println!("Loaded {rows} rows from {} into {}", csv.display(), db.display());
    Ok(())
}
