//! In-memory implementation of the repository traits.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use cloudfiles_core::{Checksum, File, MetadataPatch, OwnerId};

use crate::error::{Result, StoreError};
use crate::traits::{FileRepository, FileTransaction};

type FileKey = (OwnerId, String);

/// In-memory store implementation, meant for tests.
///
/// All data is lost when the store is dropped. Thread-safe via a std
/// `RwLock`, which an open transaction scope holds for writing until it
/// commits or rolls back. The async methods take the same lock without
/// yielding, so while a batch is in flight they block the calling thread
/// (a tokio worker, when called from async code) instead of awaiting.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Files indexed by (owner, name).
    files: HashMap<FileKey, StoredFile>,

    /// Next insertion id; listings are ordered by it.
    next_id: u64,
}

struct StoredFile {
    id: u64,
    file: File,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Number of stored files across all owners.
    pub fn len(&self) -> usize {
        self.read().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panicking transaction scope never applies its staged files, so a
    // poisoned lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, MemoryStoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryStoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStoreInner {
    fn owned_sorted(&self, owner: &OwnerId) -> Vec<File> {
        let mut stored: Vec<&StoredFile> = self
            .files
            .iter()
            .filter(|((o, _), _)| o == owner)
            .map(|(_, sf)| sf)
            .collect();
        stored.sort_by_key(|sf| sf.id);
        stored.into_iter().map(|sf| sf.file.clone()).collect()
    }
}

fn owner_key(file: &File) -> Result<FileKey> {
    let owner = file
        .owner_id
        .clone()
        .ok_or_else(|| StoreError::MissingOwner(file.metadata.name.clone()))?;
    Ok((owner, file.metadata.name.clone()))
}

/// Transaction scope over the write-locked store.
///
/// Inserts are staged and applied on commit.
struct MemoryTransaction<'a> {
    guard: RwLockWriteGuard<'a, MemoryStoreInner>,
    staged: Vec<File>,
}

impl FileTransaction for MemoryTransaction<'_> {
    fn insert(&mut self, file: &File) -> Result<()> {
        let key = owner_key(file)?;

        let staged_clash = self
            .staged
            .iter()
            .any(|f| f.owner_id.as_ref() == Some(&key.0) && f.metadata.name == key.1);
        if staged_clash || self.guard.files.contains_key(&key) {
            return Err(StoreError::Duplicate {
                owner: key.0.to_string(),
                name: key.1,
            });
        }

        let mut stored = file.clone();
        if stored.checksum.is_none() {
            stored.refresh_checksum();
        }
        self.staged.push(stored);
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        let staged = std::mem::take(&mut self.staged);
        let inner = &mut *self.guard;
        for file in staged {
            let key = owner_key(&file)?;
            let id = inner.next_id;
            inner.next_id += 1;
            inner.files.insert(key, StoredFile { id, file });
        }
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> Result<()> {
        self.staged.clear();
        Ok(())
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if !self.staged.is_empty() {
            warn!(
                discarded = self.staged.len(),
                "transaction scope dropped without commit; rolled back"
            );
        }
    }
}

#[async_trait]
impl FileRepository for MemoryStore {
    fn begin(&self) -> Result<Box<dyn FileTransaction + '_>> {
        Ok(Box::new(MemoryTransaction {
            guard: self.write(),
            staged: Vec::new(),
        }))
    }

    async fn update(&self, file: &File, new_data: Bytes) -> Result<()> {
        let key = owner_key(file)?;
        let mut inner = self.write();

        let stored = inner
            .files
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound {
                owner: key.0.to_string(),
                name: key.1.clone(),
            })?;

        stored.file.checksum = Some(Checksum::compute(&new_data));
        stored.file.data = new_data;
        debug!(owner = %key.0, name = %key.1, "replaced file data");
        Ok(())
    }

    async fn update_metadata(&self, owner: &OwnerId, patch: &MetadataPatch) -> Result<()> {
        let mut inner = self.write();
        let old_key = (owner.clone(), patch.old_name.clone());
        let new_key = (owner.clone(), patch.name.clone());

        if !inner.files.contains_key(&old_key) {
            return Err(StoreError::NotFound {
                owner: owner.to_string(),
                name: patch.old_name.clone(),
            });
        }
        if new_key != old_key && inner.files.contains_key(&new_key) {
            return Err(StoreError::Duplicate {
                owner: owner.to_string(),
                name: patch.name.clone(),
            });
        }

        let mut stored = inner
            .files
            .remove(&old_key)
            .ok_or_else(|| StoreError::InvalidData("file vanished under write lock".into()))?;
        stored.file.metadata = patch.to_metadata();
        inner.files.insert(new_key, stored);
        Ok(())
    }

    async fn delete(&self, file: &File) -> Result<()> {
        let key = owner_key(file)?;
        let mut inner = self.write();

        match inner.files.remove(&key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                owner: key.0.to_string(),
                name: key.1,
            }),
        }
    }

    async fn get_by_owner_and_name(&self, owner: &OwnerId, name: &str) -> Result<Option<File>> {
        let inner = self.read();
        Ok(inner
            .files
            .get(&(owner.clone(), name.to_string()))
            .map(|sf| sf.file.clone()))
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<File>> {
        Ok(self.read().owned_sorted(owner))
    }

    async fn list_images_by_owner(&self, owner: &OwnerId) -> Result<Vec<File>> {
        let files = self.read().owned_sorted(owner);
        Ok(files.into_iter().filter(File::is_image).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudfiles_core::FileMetadata;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    fn owned(owner: &str, name: &str, ext: &str) -> File {
        let mut file = File::new(FileMetadata::new(name, ext), &b"data"[..]);
        file.stamp_owner(OwnerId::new(owner));
        file
    }

    #[tokio::test]
    async fn test_commit_makes_files_visible() {
        let store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.insert(&owned("alice", "b", "txt")).unwrap();
        tx.insert(&owned("alice", "a", "png")).unwrap();
        tx.commit().unwrap();

        let files = store.list_by_owner(&OwnerId::new("alice")).await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(files.iter().all(|f| f.checksum.is_some()));

        let images = store
            .list_images_by_owner(&OwnerId::new("alice"))
            .await
            .unwrap();
        assert_eq!(images.len(), 1);
    }

    #[tokio::test]
    async fn test_drop_discards_staged() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().unwrap();
            tx.insert(&owned("alice", "a", "")).unwrap();
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_within_scope_and_store() {
        let store = MemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.insert(&owned("alice", "a", "")).unwrap();
        let err = tx.insert(&owned("alice", "a", "")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        tx.insert(&owned("bob", "a", "")).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin().unwrap();
        let err = tx.insert(&owned("bob", "a", "")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        tx.rollback().unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_update_metadata_keeps_position() {
        let store = MemoryStore::new();
        let alice = OwnerId::new("alice");
        let mut tx = store.begin().unwrap();
        tx.insert(&owned("alice", "a", "txt")).unwrap();
        tx.insert(&owned("alice", "b", "txt")).unwrap();
        tx.commit().unwrap();

        let patch = MetadataPatch {
            name: "z".into(),
            extension: "md".into(),
            description: String::new(),
            old_name: "a".into(),
        };
        store.update_metadata(&alice, &patch).await.unwrap();

        let names: Vec<_> = store
            .list_by_owner(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.metadata.name)
            .collect();
        assert_eq!(names, vec!["z", "b"]);

        let missing = MetadataPatch {
            old_name: "a".into(),
            ..patch
        };
        let err = store.update_metadata(&alice, &missing).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryStore::new();
        let file = owned("alice", "a", "txt");
        let mut tx = store.begin().unwrap();
        tx.insert(&file).unwrap();
        tx.commit().unwrap();

        store.update(&file, Bytes::from_static(b"new")).await.unwrap();
        let stored = store
            .get_by_owner_and_name(&OwnerId::new("alice"), "a")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.data.as_ref(), b"new");
        assert_eq!(stored.checksum, Some(Checksum::compute(b"new")));

        store.delete(&file).await.unwrap();
        assert!(store.delete(&file).await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_readers_wait_for_open_scope() {
        let store = Arc::new(MemoryStore::new());
        let (opened_tx, opened_rx) = mpsc::channel();
        let (finish_tx, finish_rx) = mpsc::channel::<()>();

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut tx = store.begin().unwrap();
                tx.insert(&owned("alice", "a", "")).unwrap();
                opened_tx.send(()).unwrap();
                finish_rx.recv().unwrap();
                tx.insert(&owned("alice", "b", "")).unwrap();
                tx.commit().unwrap();
            })
        };
        opened_rx.recv().unwrap();

        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap();
                rt.block_on(store.list_by_owner(&OwnerId::new("alice")))
                    .unwrap()
                    .len()
            })
        };

        // Blocked on the scope's write lock, never a partial view.
        thread::sleep(Duration::from_millis(50));
        assert!(!reader.is_finished());

        finish_tx.send(()).unwrap();
        writer.join().unwrap();
        assert_eq!(reader.join().unwrap(), 2);
    }
}
