//! Error types for CloudFiles operations.

use cloudfiles_core::ValidationError;
use cloudfiles_perms::PermsError;
use cloudfiles_store::StoreError;
use thiserror::Error;

use crate::pipeline::IngestionError;

/// Errors that can occur during CloudFiles operations.
#[derive(Debug, Error)]
pub enum CloudError {
    /// Client input was rejected before any storage work.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The session is not authorized, or an identity claim was rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Server configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// No such file for this owner.
    #[error("file not found: {name}")]
    NotFound { name: String },

    /// A batch was rolled back.
    #[error("Failed to add files: {0}")]
    Ingestion(#[from] IngestionError),

    /// The repository failed.
    #[error("storage error: {0}")]
    Persistence(StoreError),
}

/// Coarse classification of a [`CloudError`], one per response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Config,
    NotFound,
    Ingestion,
    Persistence,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Config | ErrorKind::Ingestion | ErrorKind::Persistence => 500,
        }
    }
}

impl CloudError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CloudError::Validation(_) => ErrorKind::Validation,
            CloudError::Unauthorized => ErrorKind::Unauthorized,
            CloudError::Config(_) => ErrorKind::Config,
            CloudError::NotFound { .. } => ErrorKind::NotFound,
            CloudError::Ingestion(_) => ErrorKind::Ingestion,
            CloudError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        CloudError::NotFound { name: name.into() }
    }
}

impl From<StoreError> for CloudError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { name, .. } => CloudError::NotFound { name },
            other => CloudError::Persistence(other),
        }
    }
}

impl From<PermsError> for CloudError {
    fn from(err: PermsError) -> Self {
        match err {
            PermsError::Unauthorized | PermsError::InvalidCookie(_) => CloudError::Unauthorized,
            PermsError::Config(msg) => CloudError::Config(msg),
            PermsError::Serialization(msg) => CloudError::Config(format!("session encoding: {}", msg)),
        }
    }
}

/// Result type for CloudFiles operations.
pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases: Vec<(CloudError, u16)> = vec![
            (ValidationError::Missing("filename").into(), 400),
            (PermsError::Unauthorized.into(), 401),
            (PermsError::Config("no admin".into()).into(), 500),
            (
                StoreError::NotFound {
                    owner: "alice".into(),
                    name: "a".into(),
                }
                .into(),
                404,
            ),
            (IngestionError::Aborted("panic".into()).into(), 500),
            (StoreError::Task("join".into()).into(), 500),
        ];

        for (err, status) in cases {
            assert_eq!(err.kind().status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_ingestion_message() {
        let err: CloudError = IngestionError::Aborted("worker panicked".into()).into();
        assert_eq!(
            err.to_string(),
            "Failed to add files: ingestion aborted: worker panicked"
        );
    }
}
