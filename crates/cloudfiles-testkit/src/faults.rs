//! Fault injection for transaction scopes.
//!
//! [`FaultyRepository`] wraps a real repository and sabotages every
//! transaction it opens at a fixed point. Everything else is delegated
//! unchanged, so the wrapped store's rollback is what gets exercised.

use std::io;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cloudfiles_core::{File, MetadataPatch, OwnerId};
use cloudfiles_store::{FileRepository, FileTransaction, Result, StoreError};

/// Where a transaction breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The insert at this zero-based position returns an error.
    FailInsert(usize),
    /// The insert at this zero-based position panics.
    PanicInsert(usize),
    /// Every insert succeeds but commit returns an error.
    FailCommit,
    /// The insert at this position succeeds after stalling for the duration.
    SlowInsert(usize, Duration),
}

/// The error returned for an injected failure.
pub fn injected_error() -> StoreError {
    StoreError::Io(io::Error::new(io::ErrorKind::Other, "injected fault"))
}

/// A repository whose transactions fail at a chosen point.
pub struct FaultyRepository<R> {
    inner: R,
    fault: Fault,
}

impl<R: FileRepository> FaultyRepository<R> {
    pub fn new(inner: R, fault: Fault) -> Self {
        Self { inner, fault }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

struct FaultyTransaction<'a> {
    inner: Box<dyn FileTransaction + 'a>,
    fault: Fault,
    inserts: usize,
}

impl FileTransaction for FaultyTransaction<'_> {
    fn insert(&mut self, file: &File) -> Result<()> {
        let position = self.inserts;
        self.inserts += 1;

        match self.fault {
            Fault::FailInsert(at) if at == position => Err(injected_error()),
            Fault::PanicInsert(at) if at == position => {
                panic!("injected panic at insert #{}", position)
            }
            Fault::SlowInsert(at, stall) if at == position => {
                thread::sleep(stall);
                self.inner.insert(file)
            }
            _ => self.inner.insert(file),
        }
    }

    fn commit(self: Box<Self>) -> Result<()> {
        match self.fault {
            // Dropping the inner scope rolls it back.
            Fault::FailCommit => Err(injected_error()),
            _ => self.inner.commit(),
        }
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        self.inner.rollback()
    }
}

#[async_trait]
impl<R: FileRepository> FileRepository for FaultyRepository<R> {
    fn begin(&self) -> Result<Box<dyn FileTransaction + '_>> {
        let inner = self.inner.begin()?;
        Ok(Box::new(FaultyTransaction {
            inner,
            fault: self.fault,
            inserts: 0,
        }))
    }

    async fn update(&self, file: &File, new_data: Bytes) -> Result<()> {
        self.inner.update(file, new_data).await
    }

    async fn update_metadata(&self, owner: &OwnerId, patch: &MetadataPatch) -> Result<()> {
        self.inner.update_metadata(owner, patch).await
    }

    async fn delete(&self, file: &File) -> Result<()> {
        self.inner.delete(file).await
    }

    async fn get_by_owner_and_name(&self, owner: &OwnerId, name: &str) -> Result<Option<File>> {
        self.inner.get_by_owner_and_name(owner, name).await
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<File>> {
        self.inner.list_by_owner(owner).await
    }

    async fn list_images_by_owner(&self, owner: &OwnerId) -> Result<Vec<File>> {
        self.inner.list_images_by_owner(owner).await
    }
}
