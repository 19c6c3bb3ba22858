//! Files and their metadata.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::encoding::base64_bytes;
use crate::types::{is_image_extension, OwnerId};

/// Descriptive metadata of a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Name the file is stored and looked up under.
    #[serde(default)]
    pub name: String,
    /// Extension without the leading dot. May be empty.
    #[serde(default)]
    pub extension: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

impl FileMetadata {
    pub fn new(name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// `name.extension`, or just the name when there is no extension.
    pub fn full_name(&self) -> String {
        if self.extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }

    pub fn is_image(&self) -> bool {
        is_image_extension(&self.extension)
    }
}

/// A stored file.
///
/// `owner_id` and `checksum` are skipped on deserialization: the owner is
/// stamped from the session and the checksum is derived from `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    #[serde(default, skip_deserializing)]
    pub owner_id: Option<OwnerId>,

    #[serde(default)]
    pub metadata: FileMetadata,

    #[serde(default, with = "base64_bytes")]
    pub data: Bytes,

    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Checksum>,
}

impl File {
    /// Create an unowned file.
    pub fn new(metadata: FileMetadata, data: impl Into<Bytes>) -> Self {
        Self {
            owner_id: None,
            metadata,
            data: data.into(),
            checksum: None,
        }
    }

    /// Assign the owner. Any previous owner is overwritten.
    pub fn stamp_owner(&mut self, owner: OwnerId) {
        self.owner_id = Some(owner);
    }

    /// Recompute the checksum from the current bytes.
    pub fn refresh_checksum(&mut self) -> Checksum {
        let checksum = Checksum::compute(&self.data);
        self.checksum = Some(checksum);
        checksum
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_image(&self) -> bool {
        self.metadata.is_image()
    }

    /// Summary without the file bytes.
    pub fn info(&self) -> FileInfo {
        FileInfo {
            metadata: self.metadata.clone(),
            size: self.data.len() as u64,
            checksum: self
                .checksum
                .unwrap_or_else(|| Checksum::compute(&self.data)),
        }
    }
}

/// File summary returned by info queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub metadata: FileMetadata,
    pub size: u64,
    pub checksum: Checksum,
}

/// Metadata update for an existing file, addressed by its current name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPatch {
    /// New name.
    #[serde(rename = "filename", default)]
    pub name: String,
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub description: String,
    /// Current name of the file being patched.
    #[serde(rename = "oldname", default)]
    pub old_name: String,
}

impl MetadataPatch {
    /// The metadata the file will carry after the patch.
    pub fn to_metadata(&self) -> FileMetadata {
        FileMetadata {
            name: self.name.clone(),
            extension: self.extension.clone(),
            description: self.description.clone(),
        }
    }
}
