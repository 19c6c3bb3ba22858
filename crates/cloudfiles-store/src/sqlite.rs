//! SQLite implementation of the repository traits.
//!
//! This is the primary storage backend for CloudFiles. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, error, warn};

use cloudfiles_core::{Checksum, File, FileMetadata, MetadataPatch, OwnerId};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{FileRepository, FileTransaction};

const FILE_COLUMNS: &str = "owner_id, name, extension, description, data, checksum";

/// SQLite-based repository implementation.
///
/// Thread-safe via internal Mutex. Single-item operations use
/// spawn_blocking to avoid blocking the async runtime; transaction scopes
/// hold the mutex for their whole lifetime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on a blocking thread.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn);
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

/// Lock the connection.
///
/// A poisoned mutex means a scope panicked while holding it. Its drop
/// already rolled the transaction back, so the connection is still usable.
fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Transaction scope over a locked connection.
struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    open: bool,
}

impl FileTransaction for SqliteTransaction<'_> {
    fn insert(&mut self, file: &File) -> Result<()> {
        insert_file(&self.conn, file)
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        self.open = false;
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> Result<()> {
        self.open = false;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        // SQLite may already have rolled back on its own after a failed COMMIT.
        if !self.open || self.conn.is_autocommit() {
            return;
        }
        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => warn!("transaction scope dropped without commit; rolled back"),
            Err(e) => error!(error = %e, "rollback of abandoned transaction failed"),
        }
    }
}

// Helper to convert a row to File
fn row_to_file(row: &rusqlite::Row<'_>) -> rusqlite::Result<File> {
    let owner: String = row.get("owner_id")?;
    let data: Vec<u8> = row.get("data")?;
    let checksum_bytes: Option<Vec<u8>> = row.get("checksum")?;

    let checksum = checksum_bytes
        .map(|b| Checksum::try_from(b.as_slice()))
        .transpose()
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(5, "checksum".into(), rusqlite::types::Type::Blob)
        })?;

    Ok(File {
        owner_id: Some(OwnerId::new(owner)),
        metadata: FileMetadata {
            name: row.get("name")?,
            extension: row.get("extension")?,
            description: row.get("description")?,
        },
        data: Bytes::from(data),
        checksum,
    })
}

fn require_owner(file: &File) -> Result<&OwnerId> {
    file.owner_id
        .as_ref()
        .ok_or_else(|| StoreError::MissingOwner(file.metadata.name.clone()))
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn insert_file(conn: &Connection, file: &File) -> Result<()> {
    let owner = require_owner(file)?;
    let checksum = file.checksum.unwrap_or_else(|| Checksum::compute(&file.data));
    let now = now_millis();

    conn.execute(
        "INSERT INTO files (
            owner_id, name, extension, description, data, size, checksum,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            owner.as_str(),
            file.metadata.name,
            file.metadata.extension,
            file.metadata.description,
            file.data.as_ref(),
            file.data.len() as i64,
            checksum.as_bytes().as_slice(),
            now,
        ],
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            StoreError::Duplicate {
                owner: owner.to_string(),
                name: file.metadata.name.clone(),
            }
        } else {
            StoreError::from(e)
        }
    })?;

    debug!(owner = %owner, name = %file.metadata.name, "inserted file");
    Ok(())
}

fn query_files(conn: &Connection, owner: &OwnerId) -> Result<Vec<File>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM files WHERE owner_id = ?1 ORDER BY id",
        FILE_COLUMNS
    ))?;

    let files = stmt
        .query_map(params![owner.as_str()], row_to_file)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(files)
}

#[async_trait]
impl FileRepository for SqliteStore {
    fn begin(&self) -> Result<Box<dyn FileTransaction + '_>> {
        let conn = lock(&self.conn);
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Box::new(SqliteTransaction { conn, open: true }))
    }

    async fn update(&self, file: &File, new_data: Bytes) -> Result<()> {
        let owner = require_owner(file)?.clone();
        let name = file.metadata.name.clone();

        self.blocking(move |conn| {
            let checksum = Checksum::compute(&new_data);
            let changed = conn.execute(
                "UPDATE files SET data = ?1, size = ?2, checksum = ?3, updated_at = ?4
                 WHERE owner_id = ?5 AND name = ?6",
                params![
                    new_data.as_ref(),
                    new_data.len() as i64,
                    checksum.as_bytes().as_slice(),
                    now_millis(),
                    owner.as_str(),
                    name,
                ],
            )?;

            if changed == 0 {
                return Err(StoreError::NotFound {
                    owner: owner.to_string(),
                    name,
                });
            }
            Ok(())
        })
        .await
    }

    async fn update_metadata(&self, owner: &OwnerId, patch: &MetadataPatch) -> Result<()> {
        let owner = owner.clone();
        let patch = patch.clone();

        self.blocking(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE files SET name = ?1, extension = ?2, description = ?3, updated_at = ?4
                     WHERE owner_id = ?5 AND name = ?6",
                    params![
                        patch.name,
                        patch.extension,
                        patch.description,
                        now_millis(),
                        owner.as_str(),
                        patch.old_name,
                    ],
                )
                .map_err(|e| {
                    if is_constraint_violation(&e) {
                        StoreError::Duplicate {
                            owner: owner.to_string(),
                            name: patch.name.clone(),
                        }
                    } else {
                        StoreError::from(e)
                    }
                })?;

            if changed == 0 {
                return Err(StoreError::NotFound {
                    owner: owner.to_string(),
                    name: patch.old_name.clone(),
                });
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, file: &File) -> Result<()> {
        let owner = require_owner(file)?.clone();
        let name = file.metadata.name.clone();

        self.blocking(move |conn| {
            let changed = conn.execute(
                "DELETE FROM files WHERE owner_id = ?1 AND name = ?2",
                params![owner.as_str(), name],
            )?;

            if changed == 0 {
                return Err(StoreError::NotFound {
                    owner: owner.to_string(),
                    name,
                });
            }
            Ok(())
        })
        .await
    }

    async fn get_by_owner_and_name(&self, owner: &OwnerId, name: &str) -> Result<Option<File>> {
        let owner = owner.clone();
        let name = name.to_string();

        self.blocking(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM files WHERE owner_id = ?1 AND name = ?2",
                    FILE_COLUMNS
                ),
                params![owner.as_str(), name],
                row_to_file,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<File>> {
        let owner = owner.clone();
        self.blocking(move |conn| query_files(conn, &owner)).await
    }

    async fn list_images_by_owner(&self, owner: &OwnerId) -> Result<Vec<File>> {
        let owner = owner.clone();
        self.blocking(move |conn| {
            let files = query_files(conn, &owner)?;
            Ok(files.into_iter().filter(File::is_image).collect())
        })
        .await
    }
}

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
