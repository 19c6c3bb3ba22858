//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cloudfiles::core::ValidationError;
use cloudfiles::perms::PermsError;
use cloudfiles::store::StoreError;
use cloudfiles::CloudError;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::ConfigError;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A request failure, rendered as a plain-text body with the status of its
/// [`ErrorKind`](cloudfiles::ErrorKind).
#[derive(Debug)]
pub struct ApiError(pub CloudError);

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError(CloudError::Unauthorized)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<CloudError> for ApiError {
    fn from(err: CloudError) -> Self {
        ApiError(err)
    }
}

impl From<PermsError> for ApiError {
    fn from(err: PermsError) -> Self {
        ApiError(err.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();

        if status.is_server_error() {
            error!(%status, error = %message, "request failed");
        } else {
            debug!(%status, error = %message, "request rejected");
        }

        (status, message).into_response()
    }
}
