//! # CloudFiles Store
//!
//! Storage abstraction for CloudFiles. Provides a trait-based interface for
//! file persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts file storage behind the [`FileRepository`]
//! trait. Batch writes go through a [`FileTransaction`] scope opened with
//! [`FileRepository::begin`]; everything else is a single-item async call.
//! The primary implementation is [`SqliteStore`], with [`MemoryStore`] for
//! testing.
//!
//! ## Key Types
//!
//! - [`FileRepository`] - The trait for all storage operations
//! - [`FileTransaction`] - A transaction scope for batch inserts
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cloudfiles_core::{File, FileMetadata, OwnerId};
//! use cloudfiles_store::{FileRepository, SqliteStore};
//!
//! fn example() -> cloudfiles_store::Result<()> {
//!     let store = SqliteStore::open("cloudfiles.db")?;
//!
//!     let mut file = File::new(FileMetadata::new("notes", "txt"), &b"hello"[..]);
//!     file.stamp_owner(OwnerId::new("alice"));
//!
//!     // Blocking: run from a blocking context.
//!     let mut tx = store.begin()?;
//!     tx.insert(&file)?;
//!     tx.commit()
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic scopes**: a transaction that is dropped without `commit`
//!   rolls back, including while unwinding from a panic
//! - **Isolation**: a scope holds the store's lock until it ends
//! - **Uniqueness**: at most one file per `(owner, name)`

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{FileRepository, FileTransaction, RepositoryExt, SharedRepository};
