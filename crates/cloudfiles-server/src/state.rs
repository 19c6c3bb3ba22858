//! Shared server state injected into all handlers.

use std::sync::Arc;

use cloudfiles::perms::{CookieStore, SessionGate};
use cloudfiles::store::{SharedRepository, SqliteStore};
use cloudfiles::FileService;
use tracing::{info, warn};

use crate::config::{Database, ServerConfig, ADMIN_VAR};
use crate::error::ServerError;

/// Shared server state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub files: Arc<FileService>,
    pub gate: Arc<SessionGate>,
}

impl AppState {
    pub fn new(files: FileService, gate: SessionGate) -> Self {
        Self {
            files: Arc::new(files),
            gate: Arc::new(gate),
        }
    }

    /// Open the database and wire the service and gate from `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let repo: SharedRepository = match &config.database {
            Database::Memory => Arc::new(SqliteStore::open_memory()?),
            Database::Path(path) => {
                info!(path = %path.display(), "opening database");
                Arc::new(SqliteStore::open(path)?)
            }
        };

        let credentials = config.credentials();
        if !credentials.is_configured() {
            warn!("{} is not set; admin authentication will fail", ADMIN_VAR);
        }

        let cookies = CookieStore::new(&config.session_secret(), config.cookie_options());
        let gate = SessionGate::new(Arc::new(credentials), cookies);
        let files = FileService::new(repo, config.service_config());

        Ok(Self::new(files, gate))
    }
}
