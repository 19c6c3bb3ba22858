//! Error types for the permissions module.

use thiserror::Error;

/// Errors that can occur during session and credential operations.
#[derive(Debug, Error)]
pub enum PermsError {
    /// The claimed identity does not match the configured administrator.
    #[error("Unauthorized")]
    Unauthorized,

    /// The administrator identity is missing or malformed.
    #[error("invalid admin user configuration: {0}")]
    Config(String),

    /// A session cookie failed verification or decoding.
    #[error("invalid session cookie: {0}")]
    InvalidCookie(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
