//! # CloudFiles
//!
//! The unified API for CloudFiles - per-user file storage with atomic batch
//! ingestion and capability-scoped sessions.
//!
//! ## Overview
//!
//! - **Ingestion**: a batch of files is persisted in one transaction scope;
//!   every file lands or none does
//! - **Queries**: lookups, listings, gallery and checksums, all scoped to
//!   one owner
//! - **Sessions**: the administrator elevates a session once; the signed
//!   cookie authorizes later requests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cloudfiles::{FileService, ServiceConfig};
//! use cloudfiles::core::{File, FileMetadata, OwnerId};
//! use cloudfiles::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("cloudfiles.db").unwrap();
//!     let service = FileService::new(Arc::new(store), ServiceConfig::default());
//!
//!     let owner = OwnerId::new("alice");
//!     let batch = vec![
//!         File::new(FileMetadata::new("a", "txt"), &b"first"[..]),
//!         File::new(FileMetadata::new("b", "txt"), &b"second"[..]),
//!     ];
//!
//!     // Both files, or neither.
//!     let report = service.add_files(&owner, batch).await.unwrap();
//!     assert_eq!(report.files.len(), 2);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `cloudfiles::core` - Files, owners, checksums, validation
//! - `cloudfiles::store` - Repository abstraction, SQLite and memory stores
//! - `cloudfiles::perms` - Sessions, signed cookies and the admin gate

pub mod error;
pub mod pipeline;
pub mod service;

// Re-export component crates
pub use cloudfiles_core as core;
pub use cloudfiles_perms as perms;
pub use cloudfiles_store as store;

// Re-export main types for convenience
pub use error::{CloudError, ErrorKind, Result};
pub use pipeline::{ingest_in_transaction, Deadline, IngestReport, IngestionError, IngestionPipeline};
pub use service::{FileChecksum, FileService, ServiceConfig, DEFAULT_INGEST_TIMEOUT};

// Re-export commonly used types
pub use cloudfiles_core::{Checksum, File, FileInfo, FileMetadata, MetadataPatch, OwnerId};
pub use cloudfiles_perms::{Capability, Session, SessionGate};
