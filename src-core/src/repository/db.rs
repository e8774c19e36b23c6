//! Database Connection and Setup
//!
//! Opens the SQLite store file and applies the fixed schema.
//! Every failure here is reported as `DomainError::StoreUnavailable`.

use rusqlite::Connection;
use std::path::Path;

use crate::domain::{DomainError, DomainResult};

/// File name of the store inside the data directory
pub const STORE_FILE: &str = "CoreTasks.sqlite";

/// Open (or create) the store file at `db_path`
pub fn open_store(db_path: &Path) -> DomainResult<Connection> {
    if let Some(dir) = db_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| {
                DomainError::store_unavailable(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }
    }

    let conn = Connection::open(db_path).map_err(|e| {
        DomainError::store_unavailable(format!("cannot open {}: {}", db_path.display(), e))
    })?;

    run_migrations(&conn)?;
    log::info!("Opened store at {}", db_path.display());
    Ok(conn)
}

/// Private in-memory store with the same schema
pub fn open_in_memory() -> DomainResult<Connection> {
    let conn = Connection::open_in_memory().map_err(DomainError::store_unavailable)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(mut rows) = stmt.query([]) else {
        return false;
    };
    while let Ok(Some(row)) = rows.next() {
        if let Ok(name) = row.get::<_, String>(1) {
            if name == column {
                return true;
            }
        }
    }
    false
}

/// Apply the schema: one `items` table, no indices beyond the row id
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY,
            text TEXT,
            completed INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .map_err(DomainError::store_unavailable)?;

    // A pre-existing table with a different shape is not something we migrate
    for column in ["id", "text", "completed"] {
        if !column_exists(conn, "items", column) {
            return Err(DomainError::store_unavailable(format!(
                "store schema is missing items.{}",
                column
            )));
        }
    }

    Ok(())
}
