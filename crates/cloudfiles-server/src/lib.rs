//! # CloudFiles Server
//!
//! HTTP front end for CloudFiles, built on axum.
//!
//! ## Overview
//!
//! The server resolves the session from the request's cookie, rejects
//! `/files` requests from unauthorized sessions with 401 before any storage
//! work, and hands everything else to the shared [`FileService`].
//!
//! ## Routes
//!
//! ```text
//! GET    /                  welcome text
//! GET    /health            {"status":"OK"}
//! GET    /admin/auth?admin= elevate the session
//! GET    /admin/check       is the session authorized
//! POST   /admin/logout      clear the session cookie
//! POST   /files             add a batch of files, all or nothing
//! GET    /files             list files
//! DELETE /files?filename=   delete a file
//! GET    /files/download    file bytes
//! GET    /files/gallery     images as an HTML page
//! GET    /files/hash        {"filename","checksum"}
//! GET    /files/info        metadata, size and checksum
//! PUT    /files/data        replace a file's bytes
//! PATCH  /files/metadata    rename and re-describe a file
//! ```
//!
//! [`FileService`]: cloudfiles::FileService

pub mod config;
pub mod error;
pub mod extract;
pub mod gallery;
pub mod logging;
pub mod routes;
pub mod state;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use config::{ConfigError, Database, ServerConfig};
pub use error::{ApiError, ServerError};
pub use state::AppState;

/// Build the application router from `config`.
pub fn build_router(config: &ServerConfig) -> Result<Router, ServerError> {
    let state = AppState::from_config(config)?;
    Ok(routes::router(state, config.max_body_bytes))
}

/// Bind `config.addr` and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(&config)?;
    let listener = TcpListener::bind(config.addr).await?;

    info!(addr = %listener.local_addr()?, "CloudFiles listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
