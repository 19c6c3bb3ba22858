//! Repository traits: the abstract interface for file persistence.
//!
//! This trait allows the service to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cloudfiles_core::{lookup_candidates, File, MetadataPatch, OwnerId};

use crate::error::Result;

/// A transaction scope for batch inserts.
///
/// Every insert made through the scope becomes visible only after
/// [`commit`](FileTransaction::commit). Dropping the scope without
/// committing rolls it back, so the store is left as it was on every exit
/// path, panics included.
pub trait FileTransaction {
    /// Insert a file. The file must carry an owner.
    ///
    /// A failure leaves the scope open; the caller decides whether to roll
    /// back.
    fn insert(&mut self, file: &File) -> Result<()>;

    /// Make every insert of this scope durable.
    fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every insert of this scope.
    fn rollback(self: Box<Self>) -> Result<()>;
}

/// The repository trait: persistence boundary for files.
///
/// Single-item operations are async; blocking backends move their work
/// onto blocking threads internally.
///
/// # Design Notes
///
/// - **Transactions are blocking**: [`begin`](FileRepository::begin) and the
///   returned scope block the calling thread, and the scope holds the
///   store's lock until it ends. Drive them from `spawn_blocking`.
/// - **Uniqueness**: at most one file per `(owner, name)`. Violations surface
///   as [`StoreError::Duplicate`](crate::StoreError::Duplicate).
/// - **Missing rows**: update and delete report
///   [`StoreError::NotFound`](crate::StoreError::NotFound).
#[async_trait]
pub trait FileRepository: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Transactional Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Open a transaction scope.
    fn begin(&self) -> Result<Box<dyn FileTransaction + '_>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Single-item Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the bytes of `file` (addressed by its owner and name).
    ///
    /// The stored checksum is recomputed from `new_data`.
    async fn update(&self, file: &File, new_data: Bytes) -> Result<()>;

    /// Rename and re-describe the file named `patch.old_name`.
    async fn update_metadata(&self, owner: &OwnerId, patch: &MetadataPatch) -> Result<()>;

    /// Delete `file` (addressed by its owner and name).
    async fn delete(&self, file: &File) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Look up a file by owner and exact name.
    async fn get_by_owner_and_name(&self, owner: &OwnerId, name: &str) -> Result<Option<File>>;

    /// All files of an owner, in insertion order.
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<File>>;

    /// Image files of an owner, in insertion order.
    async fn list_images_by_owner(&self, owner: &OwnerId) -> Result<Vec<File>>;
}

/// A repository shared between request handlers.
pub type SharedRepository = Arc<dyn FileRepository>;

/// Extension trait for common repository patterns.
pub trait RepositoryExt: FileRepository {
    /// Resolve a client-supplied filename.
    ///
    /// Tries the exact name first, then the part before the first `.`.
    fn find_file(
        &self,
        owner: &OwnerId,
        filename: &str,
    ) -> impl std::future::Future<Output = Result<Option<File>>> + Send;
}

impl<R: FileRepository + ?Sized> RepositoryExt for R {
    async fn find_file(&self, owner: &OwnerId, filename: &str) -> Result<Option<File>> {
        for candidate in lookup_candidates(filename) {
            if let Some(file) = self.get_by_owner_and_name(owner, candidate).await? {
                return Ok(Some(file));
            }
        }
        Ok(None)
    }
}
