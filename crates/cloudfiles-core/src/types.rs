//! Strong type definitions for CloudFiles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Extensions (lowercase) that the gallery treats as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

/// Opaque identifier of the user that owns a file.
///
/// Owners are assigned from the authenticated session, never from request
/// bodies.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an owner identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Check whether an extension names an image format.
pub fn is_image_extension(extension: &str) -> bool {
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Names to try, in order, when resolving a `filename` query value.
///
/// The exact value comes first. If it contains a `.`, the part before the
/// first `.` follows, so `report.pdf` also finds a file stored as `report`.
pub fn lookup_candidates(filename: &str) -> Vec<&str> {
    let mut candidates = vec![filename];
    if let Some((stem, _)) = filename.split_once('.') {
        if !stem.is_empty() && stem != filename {
            candidates.push(stem);
        }
    }
    candidates
}
