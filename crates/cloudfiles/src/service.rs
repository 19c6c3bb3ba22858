//! FileService: the unified file API shared by all request handlers.
//!
//! The service validates input, resolves client-supplied filenames, runs
//! batches through the ingestion pipeline and maps every failure into
//! [`CloudError`].

use std::time::Duration;

use cloudfiles_core::{
    compute_checksum, limits, validate_batch, validate_metadata_patch, validate_name, File,
    FileInfo, MetadataPatch, OwnerId, ValidationError,
};
use cloudfiles_store::{RepositoryExt, SharedRepository};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CloudError, Result};
use crate::pipeline::{IngestReport, IngestionPipeline};

/// Default bound on a single batch.
pub const DEFAULT_INGEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the FileService.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Deadline for one batch. `None` disables it.
    pub ingest_timeout: Option<Duration>,
    /// Maximum number of files in one batch.
    pub max_batch_files: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ingest_timeout: Some(DEFAULT_INGEST_TIMEOUT),
            max_batch_files: limits::DEFAULT_MAX_BATCH,
        }
    }
}

/// The checksum of a stored file, as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChecksum {
    /// The filename as the client asked for it.
    pub filename: String,
    /// Lowercase hex SHA-256 of the stored bytes.
    pub checksum: String,
}

/// The file API.
pub struct FileService {
    repo: SharedRepository,
    pipeline: IngestionPipeline,
    config: ServiceConfig,
}

impl FileService {
    pub fn new(repo: SharedRepository, config: ServiceConfig) -> Self {
        let pipeline = IngestionPipeline::new(SharedRepository::clone(&repo))
            .with_timeout(config.ingest_timeout);
        Self {
            repo,
            pipeline,
            config,
        }
    }

    pub fn repository(&self) -> &SharedRepository {
        &self.repo
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist a batch for `owner`, all or nothing.
    pub async fn add_files(&self, owner: &OwnerId, batch: Vec<File>) -> Result<IngestReport> {
        validate_batch(&batch, self.config.max_batch_files)?;
        Ok(self.pipeline.add_files(owner, batch).await?)
    }

    /// Delete the file stored under exactly `filename`.
    pub async fn delete_file(&self, owner: &OwnerId, filename: &str) -> Result<()> {
        let file = self.exact(owner, filename).await?;
        self.repo.delete(&file).await?;
        info!(owner = %owner, name = %file.metadata.name, "deleted file");
        Ok(())
    }

    /// Replace the bytes of the file named `file.metadata.name`.
    pub async fn replace_data(&self, owner: &OwnerId, mut file: File) -> Result<()> {
        validate_name(&file.metadata.name)?;
        file.stamp_owner(owner.clone());
        let data = file.data.clone();
        self.repo.update(&file, data).await?;
        Ok(())
    }

    /// Rename and re-describe the file named `patch.old_name`.
    pub async fn update_metadata(&self, owner: &OwnerId, patch: &MetadataPatch) -> Result<()> {
        validate_metadata_patch(patch)?;
        self.repo.update_metadata(owner, patch).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// The file `filename` resolves to, bytes included.
    pub async fn download(&self, owner: &OwnerId, filename: &str) -> Result<File> {
        self.resolve(owner, filename).await
    }

    /// Every file of `owner`, in insertion order.
    pub async fn list_files(&self, owner: &OwnerId) -> Result<Vec<File>> {
        Ok(self.repo.list_by_owner(owner).await?)
    }

    /// The image files of `owner`, in insertion order.
    pub async fn gallery(&self, owner: &OwnerId) -> Result<Vec<File>> {
        Ok(self.repo.list_images_by_owner(owner).await?)
    }

    /// SHA-256 of the bytes stored under exactly `filename`.
    pub async fn checksum(&self, owner: &OwnerId, filename: &str) -> Result<FileChecksum> {
        let file = self.exact(owner, filename).await?;
        Ok(FileChecksum {
            filename: filename.to_string(),
            checksum: compute_checksum(&file.data),
        })
    }

    /// Metadata, size and checksum of a file.
    pub async fn file_info(&self, owner: &OwnerId, filename: &str) -> Result<FileInfo> {
        Ok(self.resolve(owner, filename).await?.info())
    }

    /// Exact stored name only, no stem fallback.
    async fn exact(&self, owner: &OwnerId, filename: &str) -> Result<File> {
        if filename.is_empty() {
            return Err(ValidationError::Missing("filename").into());
        }
        self.repo
            .get_by_owner_and_name(owner, filename)
            .await?
            .ok_or_else(|| CloudError::not_found(filename))
    }

    /// Exact name, then the part before the first `.`.
    async fn resolve(&self, owner: &OwnerId, filename: &str) -> Result<File> {
        if filename.is_empty() {
            return Err(ValidationError::Missing("filename").into());
        }
        debug!(owner = %owner, filename, "resolving file");
        self.repo
            .find_file(owner, filename)
            .await?
            .ok_or_else(|| CloudError::not_found(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use cloudfiles_core::FileMetadata;
    use cloudfiles_store::MemoryStore;
    use std::sync::Arc;

    use crate::error::ErrorKind;

    fn service() -> FileService {
        FileService::new(Arc::new(MemoryStore::new()), ServiceConfig::default())
    }

    fn file(name: &str, ext: &str, data: &'static [u8]) -> File {
        File::new(FileMetadata::new(name, ext), data)
    }

    fn alice() -> OwnerId {
        OwnerId::new("alice")
    }

    #[tokio::test]
    async fn test_checksum_of_hello() {
        let service = service();
        service
            .add_files(&alice(), vec![file("greeting", "txt", b"hello")])
            .await
            .unwrap();

        let sum = service.checksum(&alice(), "greeting").await.unwrap();
        assert_eq!(sum.filename, "greeting");
        assert_eq!(
            sum.checksum,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_download_strips_extension() {
        let service = service();
        service
            .add_files(&alice(), vec![file("report", "pdf", b"%PDF")])
            .await
            .unwrap();

        let file = service.download(&alice(), "report.pdf").await.unwrap();
        assert_eq!(file.metadata.full_name(), "report.pdf");

        // Other owners never see it.
        let err = service
            .download(&OwnerId::new("bob"), "report")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_missing_filename_is_validation_error() {
        let service = service();
        for err in [
            service.download(&alice(), "").await.unwrap_err(),
            service.delete_file(&alice(), "").await.unwrap_err(),
            service.checksum(&alice(), "").await.unwrap_err(),
            service.file_info(&alice(), "").await.unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[tokio::test]
    async fn test_batch_limit_and_invalid_names() {
        let service = FileService::new(
            Arc::new(MemoryStore::new()),
            ServiceConfig {
                max_batch_files: 1,
                ..Default::default()
            },
        );

        let err = service
            .add_files(&alice(), vec![file("a", "", b""), file("b", "", b"")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = service
            .add_files(&alice(), vec![file("../a", "", b"")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(service.list_files(&alice()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_update_delete() {
        let service = service();
        service
            .add_files(
                &alice(),
                vec![file("a", "txt", b"old"), file("pic", "png", b"\x89PNG")],
            )
            .await
            .unwrap();

        let mut replacement = file("a", "txt", b"");
        replacement.data = Bytes::from_static(b"new bytes");
        service.replace_data(&alice(), replacement).await.unwrap();
        let info = service.file_info(&alice(), "a").await.unwrap();
        assert_eq!(info.size, 9);
        assert!(info.checksum.verify(b"new bytes"));

        let patch = MetadataPatch {
            name: "b".into(),
            extension: "md".into(),
            description: "notes".into(),
            old_name: "a".into(),
        };
        service.update_metadata(&alice(), &patch).await.unwrap();
        assert_eq!(
            service.file_info(&alice(), "b").await.unwrap().metadata.description,
            "notes"
        );

        let gallery = service.gallery(&alice()).await.unwrap();
        assert_eq!(gallery.len(), 1);

        service.delete_file(&alice(), "b").await.unwrap();
        let err = service.delete_file(&alice(), "b").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(service.list_files(&alice()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_missing_file() {
        let err = service()
            .replace_data(&alice(), file("ghost", "", b"x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_needs_exact_name() {
        let service = service();
        service
            .add_files(&alice(), vec![file("notes", "txt", b"keep me")])
            .await
            .unwrap();

        let err = service.delete_file(&alice(), "notes.bak").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = service.delete_file(&alice(), "notes.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let stored = service.list_files(&alice()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].metadata.name, "notes");
    }

    #[tokio::test]
    async fn test_checksum_needs_exact_name() {
        let service = service();
        service
            .add_files(&alice(), vec![file("notes", "txt", b"hello")])
            .await
            .unwrap();

        let err = service.checksum(&alice(), "notes.bak").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // Download and info still accept the full name.
        assert_eq!(
            service.download(&alice(), "notes.txt").await.unwrap().metadata.name,
            "notes"
        );
        assert_eq!(service.file_info(&alice(), "notes.txt").await.unwrap().size, 5);
    }
}
