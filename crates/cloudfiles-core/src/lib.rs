//! # CloudFiles Core
//!
//! Pure primitives for CloudFiles: files, owners, checksums and input
//! validation.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`File`] - A stored file: owner, metadata and bytes
//! - [`FileMetadata`] - Name, extension and description of a file
//! - [`OwnerId`] - Opaque identifier of the user owning a file
//! - [`Checksum`] - SHA-256 digest of file bytes
//! - [`MetadataPatch`] - A rename/describe request for an existing file
//!
//! ## Ownership
//!
//! A file's owner is always assigned server-side. [`File`] never
//! deserializes `owner_id` or `checksum` from client input.

pub mod checksum;
pub mod encoding;
pub mod error;
pub mod file;
pub mod types;
pub mod validation;

pub use checksum::{compute_checksum, Checksum};
pub use error::{CoreError, ValidationError};
pub use file::{File, FileInfo, FileMetadata, MetadataPatch};
pub use types::{is_image_extension, lookup_candidates, OwnerId, IMAGE_EXTENSIONS};
pub use validation::{limits, validate_batch, validate_file, validate_metadata_patch, validate_name};
