//! Input validation: names, extensions, batches and metadata patches.
//!
//! Validation runs before any storage work. It never inspects ownership,
//! which is assigned server-side, and it does not look for duplicate names
//! inside a batch: uniqueness is the repository's policy.

use crate::error::ValidationError;
use crate::file::{File, MetadataPatch};

/// Size limits for client-supplied values.
pub mod limits {
    /// Maximum file name length in bytes.
    pub const MAX_NAME_LEN: usize = 255;
    /// Maximum extension length in bytes.
    pub const MAX_EXTENSION_LEN: usize = 32;
    /// Maximum description length in bytes.
    pub const MAX_DESCRIPTION_LEN: usize = 4096;
    /// Default maximum number of files in one batch.
    pub const DEFAULT_MAX_BATCH: usize = 256;
}

/// Validate a file name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.len() > limits::MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            max: limits::MAX_NAME_LEN,
        });
    }
    if let Some(c) = name
        .chars()
        .find(|c| *c == '/' || *c == '\\' || c.is_control())
    {
        return Err(ValidationError::IllegalCharacter(c));
    }
    Ok(())
}

fn validate_extension(extension: &str) -> Result<(), ValidationError> {
    if extension.len() > limits::MAX_EXTENSION_LEN
        || !extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ValidationError::InvalidExtension(extension.to_string()));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.len() > limits::MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong {
            max: limits::MAX_DESCRIPTION_LEN,
        });
    }
    Ok(())
}

/// Validate a single file's metadata.
pub fn validate_file(file: &File) -> Result<(), ValidationError> {
    validate_name(&file.metadata.name)?;
    validate_extension(&file.metadata.extension)?;
    validate_description(&file.metadata.description)
}

/// Validate every file of a batch and its size.
///
/// An empty batch is valid.
pub fn validate_batch(batch: &[File], max_files: usize) -> Result<(), ValidationError> {
    if batch.len() > max_files {
        return Err(ValidationError::BatchTooLarge {
            len: batch.len(),
            max: max_files,
        });
    }
    batch.iter().try_for_each(validate_file)
}

/// Validate a metadata patch.
pub fn validate_metadata_patch(patch: &MetadataPatch) -> Result<(), ValidationError> {
    if patch.old_name.is_empty() {
        return Err(ValidationError::Missing("oldname"));
    }
    validate_name(&patch.name)?;
    validate_extension(&patch.extension)?;
    validate_description(&patch.description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileMetadata;

    fn file(name: &str, ext: &str) -> File {
        File::new(FileMetadata::new(name, ext), &b"x"[..])
    }

    #[test]
    fn test_valid_names() {
        assert!(validate_name("a").is_ok());
        assert!(validate_name("report 2024").is_ok());
        assert!(validate_name("a.txt").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(validate_name(""), Err(ValidationError::EmptyName));
        assert_eq!(
            validate_name("../etc"),
            Err(ValidationError::IllegalCharacter('/'))
        );
        assert_eq!(
            validate_name("a\0b"),
            Err(ValidationError::IllegalCharacter('\0'))
        );
        assert!(matches!(
            validate_name(&"x".repeat(256)),
            Err(ValidationError::NameTooLong { .. })
        ));
    }

    #[test]
    fn test_extension_rules() {
        assert!(validate_file(&file("a", "")).is_ok());
        assert!(validate_file(&file("a", "png")).is_ok());
        assert!(validate_file(&file("a", ".png")).is_err());
        assert!(validate_file(&file("a", "tar.gz")).is_err());
    }

    #[test]
    fn test_batch_limits() {
        assert!(validate_batch(&[], 2).is_ok());
        assert!(validate_batch(&[file("a", ""), file("b", "")], 2).is_ok());
        assert_eq!(
            validate_batch(&[file("a", ""), file("b", ""), file("c", "")], 2),
            Err(ValidationError::BatchTooLarge { len: 3, max: 2 })
        );
    }

    #[test]
    fn test_batch_allows_duplicate_names() {
        assert!(validate_batch(&[file("a", ""), file("a", "")], 10).is_ok());
    }

    #[test]
    fn test_batch_reports_first_invalid_file() {
        let batch = [file("ok", ""), file("", "")];
        assert_eq!(validate_batch(&batch, 10), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_metadata_patch_requires_old_name() {
        let patch = MetadataPatch {
            name: "b".into(),
            ..Default::default()
        };
        assert_eq!(
            validate_metadata_patch(&patch),
            Err(ValidationError::Missing("oldname"))
        );
    }
}
