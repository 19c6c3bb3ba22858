//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use cloudfiles::{FileService, ServiceConfig};
use cloudfiles_core::{File, FileMetadata, OwnerId};
use cloudfiles_store::{FileRepository, MemoryStore, SharedRepository, SqliteStore};

/// A file service over a fresh store, with one owner.
pub struct TestFixture {
    pub owner: OwnerId,
    pub repo: SharedRepository,
    pub service: FileService,
}

impl TestFixture {
    /// Create a fixture over an empty in-memory store.
    pub fn new() -> Self {
        Self::with_repository(Arc::new(MemoryStore::new()))
    }

    /// Create a fixture over an empty in-memory SQLite database.
    pub fn sqlite() -> Self {
        match SqliteStore::open_memory() {
            Ok(store) => Self::with_repository(Arc::new(store)),
            Err(e) => panic!("failed to open in-memory database: {}", e),
        }
    }

    /// Create a fixture over `repo`, with the default configuration.
    pub fn with_repository(repo: SharedRepository) -> Self {
        Self::with_config(repo, ServiceConfig::default())
    }

    pub fn with_config(repo: SharedRepository, config: ServiceConfig) -> Self {
        Self {
            owner: OwnerId::new("alice"),
            service: FileService::new(SharedRepository::clone(&repo), config),
            repo,
        }
    }

    /// Use `owner` instead of the default one.
    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner = OwnerId::new(owner);
        self
    }

    /// Names of the owner's stored files, in insertion order.
    pub async fn stored_names(&self) -> Vec<String> {
        match self.repo.list_by_owner(&self.owner).await {
            Ok(files) => files.into_iter().map(|f| f.metadata.name).collect(),
            Err(e) => panic!("failed to list files: {}", e),
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// An unowned text file.
pub fn file(name: &str, contents: &str) -> File {
    File::new(FileMetadata::new(name, "txt"), contents.as_bytes().to_vec())
}

/// An unowned image file.
pub fn image(name: &str, extension: &str, data: &[u8]) -> File {
    File::new(FileMetadata::new(name, extension), data.to_vec())
}

/// Distinct owners for multi-user tests.
pub fn owners(count: usize) -> Vec<OwnerId> {
    (0..count).map(|i| OwnerId::new(format!("user-{}", i))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_starts_empty() {
        for fixture in [TestFixture::new(), TestFixture::sqlite()] {
            assert!(fixture.stored_names().await.is_empty());
            assert!(fixture.service.list_files(&fixture.owner).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_fixture_ingests() {
        let fixture = TestFixture::new().owned_by("bob");
        fixture
            .service
            .add_files(&fixture.owner, vec![file("a", "1"), image("b", "png", b"2")])
            .await
            .unwrap();

        assert_eq!(fixture.stored_names().await, vec!["a", "b"]);
        assert_eq!(fixture.service.gallery(&fixture.owner).await.unwrap().len(), 1);
    }

    #[test]
    fn test_owners_are_distinct() {
        let owners = owners(3);
        assert_ne!(owners[0], owners[1]);
        assert_ne!(owners[1], owners[2]);
        assert_ne!(owners[0], owners[2]);
    }
}
