//! # CloudFiles Testkit
//!
//! Testing utilities for CloudFiles.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known checksums for fixed inputs
//! - **Generators**: Proptest strategies for files and batches
//! - **Fixtures**: A ready-made service over a fresh store
//! - **Faults**: A repository wrapper that fails or panics mid-batch
//!
//! ## Golden Vectors
//!
//! ```rust
//! use cloudfiles_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, hex) in verify_all_vectors() {
//!     assert!(ok, "{}: got {}", name, hex);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use cloudfiles_testkit::generators::unique_batch;
//!
//! proptest! {
//!     #[test]
//!     fn names_are_distinct(batch in unique_batch(8)) {
//!         let mut names: Vec<_> = batch.iter().map(|f| f.name().to_string()).collect();
//!         names.dedup();
//!         prop_assert_eq!(names.len(), batch.len());
//!     }
//! }
//! ```
//!
//! ## Fault Injection
//!
//! ```rust
//! use std::sync::Arc;
//! use cloudfiles_store::MemoryStore;
//! use cloudfiles_testkit::faults::{Fault, FaultyRepository};
//!
//! // The third insert of every transaction fails.
//! let repo = FaultyRepository::new(MemoryStore::new(), Fault::FailInsert(2));
//! let repo = Arc::new(repo);
//! ```

pub mod faults;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use faults::{Fault, FaultyRepository};
pub use fixtures::{file, image, owners, TestFixture};
pub use generators::{batch_with_duplicate, unique_batch, FileParams};
pub use vectors::{all_vectors, verify_all_vectors, ChecksumVector};
