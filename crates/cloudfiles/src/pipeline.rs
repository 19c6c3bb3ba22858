//! Transactional multi-file ingestion.
//!
//! A batch is persisted as one unit: every file lands, or none does. The
//! transaction runs on a blocking worker and its scope rolls back on every
//! exit path that does not reach commit, panics included.

use std::time::{Duration, Instant};

use cloudfiles_core::{File, FileInfo, OwnerId};
use cloudfiles_store::{FileRepository, FileTransaction, SharedRepository, StoreError};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why a batch was not persisted. The store is unchanged in every case.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The transaction could not be opened.
    #[error("failed to start transaction: {0}")]
    Begin(#[source] StoreError),

    /// Inserting one file failed.
    #[error("file #{index} ({name}): {source}{}", rollback_note(.rollback_error))]
    Item {
        index: usize,
        name: String,
        #[source]
        source: StoreError,
        /// Set when the rollback itself reported an error.
        rollback_error: Option<String>,
    },

    /// The batch did not finish before its deadline.
    #[error(
        "timed out after {timeout:?} with {completed} of {total} files inserted{}",
        rollback_note(.rollback_error)
    )]
    TimedOut {
        timeout: Duration,
        completed: usize,
        total: usize,
        rollback_error: Option<String>,
    },

    /// Commit failed.
    #[error("failed to commit transaction: {0}")]
    Commit(#[source] StoreError),

    /// The worker running the transaction died.
    #[error("ingestion aborted: {0}")]
    Aborted(String),
}

fn rollback_note(rollback_error: &Option<String>) -> String {
    match rollback_error {
        Some(e) => format!("; rollback failed: {}", e),
        None => String::new(),
    }
}

/// A point in time after which a batch stops inserting.
///
/// It bounds the batch between inserts. Expiry is noticed before the next
/// insert starts, so an insert that stalls runs to completion first, and a
/// stall in the last insert does not stop the commit. It is not a hard
/// wall-clock limit on the whole call.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    timeout: Duration,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            timeout,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Outcome of a committed batch.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub owner: OwnerId,
    /// Stored files, in input order.
    pub files: Vec<FileInfo>,
    pub elapsed: Duration,
}

/// Roll back and report the rollback's own failure, if any.
fn abort(tx: Box<dyn FileTransaction + '_>) -> Option<String> {
    match tx.rollback() {
        Ok(()) => None,
        Err(e) => {
            error!(error = %e, "rollback failed");
            Some(e.to_string())
        }
    }
}

/// Persist `batch` for `owner` in one transaction scope.
///
/// Blocking. Each file is stamped with `owner` and its checksum before it is
/// inserted, in input order. The deadline, if any, is checked between
/// inserts, never during one.
pub fn ingest_in_transaction(
    repo: &dyn FileRepository,
    owner: &OwnerId,
    batch: Vec<File>,
    deadline: Option<Deadline>,
) -> Result<Vec<FileInfo>, IngestionError> {
    let total = batch.len();
    let mut tx = repo.begin().map_err(IngestionError::Begin)?;
    let mut stored = Vec::with_capacity(total);

    for (index, mut file) in batch.into_iter().enumerate() {
        if let Some(deadline) = deadline.filter(Deadline::is_expired) {
            let rollback_error = abort(tx);
            return Err(IngestionError::TimedOut {
                timeout: deadline.timeout(),
                completed: index,
                total,
                rollback_error,
            });
        }

        file.stamp_owner(owner.clone());
        file.refresh_checksum();

        if let Err(source) = tx.insert(&file) {
            let rollback_error = abort(tx);
            return Err(IngestionError::Item {
                index,
                name: file.metadata.name,
                source,
                rollback_error,
            });
        }

        debug!(index, name = %file.metadata.name, "staged file");
        stored.push(file.info());
    }

    tx.commit().map_err(IngestionError::Commit)?;
    Ok(stored)
}

/// Runs batches against a shared repository.
///
/// Holds no locks of its own: each call opens its own transaction scope.
#[derive(Clone)]
pub struct IngestionPipeline {
    repo: SharedRepository,
    timeout: Option<Duration>,
}

impl IngestionPipeline {
    pub fn new(repo: SharedRepository) -> Self {
        Self {
            repo,
            timeout: None,
        }
    }

    /// Bound every batch by `timeout`. `None` disables the bound.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Persist `batch` for `owner`, all or nothing.
    pub async fn add_files(
        &self,
        owner: &OwnerId,
        batch: Vec<File>,
    ) -> Result<IngestReport, IngestionError> {
        let started = Instant::now();
        let deadline = self.timeout.map(Deadline::after);
        let repo = SharedRepository::clone(&self.repo);
        let worker_owner = owner.clone();
        let total = batch.len();

        let result = tokio::task::spawn_blocking(move || {
            ingest_in_transaction(repo.as_ref(), &worker_owner, batch, deadline)
        })
        .await
        .map_err(|e| IngestionError::Aborted(e.to_string()))
        .and_then(|r| r);

        match result {
            Ok(files) => {
                let elapsed = started.elapsed();
                info!(owner = %owner, count = files.len(), ?elapsed, "batch committed");
                Ok(IngestReport {
                    owner: owner.clone(),
                    files,
                    elapsed,
                })
            }
            Err(e) => {
                warn!(owner = %owner, total, error = %e, "batch rolled back");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudfiles_core::{Checksum, FileMetadata};
    use cloudfiles_store::{MemoryStore, SqliteStore};
    use std::sync::Arc;

    fn file(name: &str, data: &'static [u8]) -> File {
        File::new(FileMetadata::new(name, "txt"), data)
    }

    #[tokio::test]
    async fn test_batch_commits_in_order() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestionPipeline::new(store.clone());
        let alice = OwnerId::new("alice");

        let report = pipeline
            .add_files(&alice, vec![file("a", b"1"), file("b", b"2")])
            .await
            .unwrap();
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[1].checksum, Checksum::compute(b"2"));

        let stored = store.list_by_owner(&alice).await.unwrap();
        let names: Vec<_> = stored.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(stored.iter().all(|f| f.owner_id.as_ref() == Some(&alice)));
    }

    #[tokio::test]
    async fn test_empty_batch_commits() {
        let store = Arc::new(MemoryStore::new());
        let report = IngestionPipeline::new(store.clone())
            .add_files(&OwnerId::new("alice"), Vec::new())
            .await
            .unwrap();
        assert!(report.files.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_in_batch_rolls_back() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let pipeline = IngestionPipeline::new(store.clone());
        let alice = OwnerId::new("alice");

        let err = pipeline
            .add_files(&alice, vec![file("a", b"1"), file("b", b"2"), file("a", b"3")])
            .await
            .unwrap_err();

        match err {
            IngestionError::Item {
                index,
                name,
                rollback_error,
                ..
            } => {
                assert_eq!(index, 2);
                assert_eq!(name, "a");
                assert!(rollback_error.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.list_by_owner(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_deadline_rolls_back() {
        let store = MemoryStore::new();
        let deadline = Deadline::after(Duration::ZERO);

        let err = ingest_in_transaction(
            &store,
            &OwnerId::new("alice"),
            vec![file("a", b"1")],
            Some(deadline),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            IngestionError::TimedOut {
                completed: 0,
                total: 1,
                ..
            }
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_error_messages() {
        let err = IngestionError::Item {
            index: 1,
            name: "b.txt".into(),
            source: StoreError::Duplicate {
                owner: "alice".into(),
                name: "b.txt".into(),
            },
            rollback_error: Some("disk I/O error".into()),
        };
        assert_eq!(
            err.to_string(),
            "file #1 (b.txt): file already exists: alice/b.txt; rollback failed: disk I/O error"
        );
    }
}
