//! Error types for CloudFiles Core.

use thiserror::Error;

/// Core errors that can occur while handling file primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid checksum: {0}")]
    InvalidChecksum(String),
}

/// Validation errors for client-supplied input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("file name must not be empty")]
    EmptyName,

    #[error("file name exceeds {max} bytes")]
    NameTooLong { max: usize },

    #[error("file name contains an illegal character: {0:?}")]
    IllegalCharacter(char),

    #[error("invalid extension: {0:?}")]
    InvalidExtension(String),

    #[error("description exceeds {max} bytes")]
    DescriptionTooLong { max: usize },

    #[error("batch of {len} files exceeds the limit of {max}")]
    BatchTooLarge { len: usize, max: usize },

    #[error("invalid request payload: {0}")]
    InvalidPayload(String),
}
