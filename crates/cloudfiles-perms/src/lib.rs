//! # CloudFiles Permissions
//!
//! Capability-scoped sessions persisted in signed cookies.
//!
//! ## Overview
//!
//! An anonymous client becomes an administrator by presenting the
//! configured administrator username once. The [`SessionGate`] then grants
//! every [`Capability`] to the session, binds the administrator's owner id,
//! and hands back a signed cookie. Later requests present the cookie and are
//! authorized without repeating the claim.
//!
//! ## Key Concepts
//!
//! - **Capability**: a named boolean privilege (admin, sql, cmd)
//! - **Session**: capabilities plus the bound owner; new when no valid
//!   cookie established it
//! - **CookieStore**: signs and verifies session cookies (BLAKE3 keyed MAC)
//! - **CredentialStore**: the administrator identity, loaded once
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cloudfiles_perms::{
//!     AdminIdentity, CookieOptions, CookieStore, CredentialStore, SessionGate,
//! };
//!
//! let gate = SessionGate::new(
//!     Arc::new(CredentialStore::new(AdminIdentity::new("alice"))),
//!     CookieStore::new(b"session secret", CookieOptions::default()),
//! );
//!
//! let mut session = gate.session(["theme=dark"]);
//! let set_cookie = gate.authenticate(&mut session, "alice").unwrap();
//! assert!(gate.check_authorized(&session));
//! ```

pub mod capability;
pub mod cookie_store;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod session;

pub use capability::Capability;
pub use cookie_store::{CookieOptions, CookieStore, DEFAULT_SESSION_TTL, SESSION_COOKIE_NAME};
pub use credentials::{AdminIdentity, CredentialStore};
pub use error::{PermsError, Result};
pub use gate::SessionGate;
pub use session::Session;

pub use cookie::{Cookie, SameSite};
