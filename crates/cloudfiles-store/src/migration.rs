//! SQLite schema versions.
//!
//! `MIGRATIONS[n]` upgrades a database from version `n` to `n + 1`. The
//! applied versions are recorded in `schema_migrations`, and pending steps
//! run inside one transaction, so a database is never left half-upgraded.

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::{Result, StoreError};

/// Schema steps, oldest first.
const MIGRATIONS: &[&str] = &[
    // v1: one row per stored file, unique per owner.
    r#"
    CREATE TABLE files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        extension TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        data BLOB NOT NULL,
        size INTEGER NOT NULL,
        checksum BLOB,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        UNIQUE(owner_id, name)
    );

    CREATE INDEX idx_files_owner ON files(owner_id, id);
    "#,
];

/// Version a fully migrated database reports.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Highest applied version, 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> Result<u32> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Bring the schema up to [`CURRENT_VERSION`]. Safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
    )?;

    let from = schema_version(conn)?;
    if from > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database is at schema v{}, this build knows v{}",
            from, CURRENT_VERSION
        )));
    }
    if from == CURRENT_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (step, sql) in MIGRATIONS.iter().enumerate().skip(from as usize) {
        let version = step as u32 + 1;
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            params![version, crate::sqlite::now_millis()],
        )?;
        debug!(version, "applied schema step");
    }
    tx.commit()?;

    info!(from, to = CURRENT_VERSION, "database schema upgraded");
    Ok(())
}
