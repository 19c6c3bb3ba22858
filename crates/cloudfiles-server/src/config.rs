//! Server configuration, loaded once from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use cloudfiles::perms::{AdminIdentity, CookieOptions, CredentialStore, DEFAULT_SESSION_TTL};
use cloudfiles::{ServiceConfig, DEFAULT_INGEST_TIMEOUT};
use rand::RngCore;
use thiserror::Error;
use tracing::warn;

pub const ADDR_VAR: &str = "CLOUDFILES_ADDR";
pub const DB_VAR: &str = "CLOUDFILES_DB";
pub const ADMIN_VAR: &str = "ADMIN_USER";
pub const SESSION_TOKEN_VAR: &str = "SESSION_TOKEN";
pub const SECURE_COOKIES_VAR: &str = "CLOUDFILES_SECURE_COOKIES";
pub const SESSION_TTL_VAR: &str = "CLOUDFILES_SESSION_TTL_SECS";
pub const INGEST_TIMEOUT_VAR: &str = "CLOUDFILES_INGEST_TIMEOUT_SECS";
pub const MAX_BATCH_VAR: &str = "CLOUDFILES_MAX_BATCH";
pub const MAX_BODY_VAR: &str = "CLOUDFILES_MAX_BODY_BYTES";

/// Default request body limit: 64 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// A configuration variable could not be used.
#[derive(Debug, Error)]
#[error("{var}: {message}")]
pub struct ConfigError {
    pub var: &'static str,
    pub message: String,
}

impl ConfigError {
    fn new(var: &'static str, message: impl Into<String>) -> Self {
        Self {
            var,
            message: message.into(),
        }
    }
}

/// Where files are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
    /// An in-memory SQLite database, lost on exit.
    Memory,
    /// A SQLite database file.
    Path(PathBuf),
}

/// Configuration for the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub database: Database,
    /// The administrator. `None` makes every authentication fail closed.
    pub admin: Option<AdminIdentity>,
    /// Cookie signing secret. `None` uses a random per-process secret.
    pub session_secret: Option<Vec<u8>>,
    pub secure_cookies: bool,
    pub session_ttl: Duration,
    /// Deadline for one batch. `None` disables it.
    pub ingest_timeout: Option<Duration>,
    pub max_batch_files: usize,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database: Database::Path(PathBuf::from("cloudfiles.db")),
            admin: None,
            session_secret: None,
            secure_cookies: false,
            session_ttl: DEFAULT_SESSION_TTL,
            ingest_timeout: Some(DEFAULT_INGEST_TIMEOUT),
            max_batch_files: cloudfiles::core::limits::DEFAULT_MAX_BATCH,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let addr = parse_or(get(ADDR_VAR), ADDR_VAR, defaults.addr)?;

        let database = match get(DB_VAR) {
            Some(v) if v == ":memory:" => Database::Memory,
            Some(v) => Database::Path(PathBuf::from(v)),
            None => defaults.database,
        };

        let admin = get(ADMIN_VAR)
            .map(|json| {
                AdminIdentity::from_json(&json).map_err(|e| ConfigError::new(ADMIN_VAR, e.to_string()))
            })
            .transpose()?;

        let session_secret = get(SESSION_TOKEN_VAR).map(String::into_bytes);

        let secure_cookies = match get(SECURE_COOKIES_VAR) {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                ConfigError::new(SECURE_COOKIES_VAR, format!("expected a boolean, got {:?}", v))
            })?,
            None => defaults.secure_cookies,
        };

        let ttl_secs: u64 = parse_or(get(SESSION_TTL_VAR), SESSION_TTL_VAR, defaults.session_ttl.as_secs())?;
        if ttl_secs == 0 {
            return Err(ConfigError::new(SESSION_TTL_VAR, "must be positive"));
        }

        let ingest_timeout = match get(INGEST_TIMEOUT_VAR) {
            Some(v) => {
                let secs: u64 = parse(&v, INGEST_TIMEOUT_VAR)?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => defaults.ingest_timeout,
        };

        let max_batch_files = parse_or(get(MAX_BATCH_VAR), MAX_BATCH_VAR, defaults.max_batch_files)?;
        if max_batch_files == 0 {
            return Err(ConfigError::new(MAX_BATCH_VAR, "must be positive"));
        }

        let max_body_bytes = parse_or(get(MAX_BODY_VAR), MAX_BODY_VAR, defaults.max_body_bytes)?;
        if max_body_bytes == 0 {
            return Err(ConfigError::new(MAX_BODY_VAR, "must be positive"));
        }

        Ok(Self {
            addr,
            database,
            admin,
            session_secret,
            secure_cookies,
            session_ttl: Duration::from_secs(ttl_secs),
            ingest_timeout,
            max_batch_files,
            max_body_bytes,
        })
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            ingest_timeout: self.ingest_timeout,
            max_batch_files: self.max_batch_files,
        }
    }

    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            ttl: self.session_ttl,
            secure: self.secure_cookies,
            ..CookieOptions::default()
        }
    }

    pub fn credentials(&self) -> CredentialStore {
        match &self.admin {
            Some(admin) => CredentialStore::new(admin.clone()),
            None => CredentialStore::unconfigured(),
        }
    }

    /// The configured cookie secret, or a fresh random one.
    pub fn session_secret(&self) -> Vec<u8> {
        if let Some(secret) = &self.session_secret {
            return secret.clone();
        }

        warn!(
            "{} is not set; using a random secret, sessions will not survive a restart",
            SESSION_TOKEN_VAR
        );
        let mut secret = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        secret
    }
}

fn parse<T: FromStr>(value: &str, var: &'static str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::new(var, format!("{:?}: {}", value, e)))
}

fn parse_or<T: FromStr>(value: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => parse(&v, var),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
