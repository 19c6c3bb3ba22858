//! The session authorization gate.
//!
//! The gate is the only component that elevates a session. A session moves
//! from anonymous to authenticated only through [`SessionGate::authenticate`],
//! and back to anonymous when its cookie expires or is cleared.

use std::sync::Arc;

use cloudfiles_core::OwnerId;
use cookie::Cookie;
use tracing::{info, warn};

use crate::capability::Capability;
use crate::cookie_store::{now_secs, CookieStore};
use crate::credentials::CredentialStore;
use crate::error::{PermsError, Result};
use crate::session::Session;

/// Validates identity claims and answers authorization questions.
pub struct SessionGate {
    credentials: Arc<CredentialStore>,
    cookies: CookieStore,
}

impl SessionGate {
    pub fn new(credentials: Arc<CredentialStore>, cookies: CookieStore) -> Self {
        Self {
            credentials,
            cookies,
        }
    }

    /// Resolve the session carried by the request's `Cookie` headers.
    pub fn session<'a, I>(&self, cookie_headers: I) -> Session
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.cookies.load(cookie_headers)
    }

    /// Elevate `session` if `claimed` is the configured administrator.
    ///
    /// On success every capability is granted, the administrator's owner id
    /// is bound, and the returned cookie persists the session. On failure
    /// `session` is left untouched and no cookie is produced.
    pub fn authenticate(&self, session: &mut Session, claimed: &str) -> Result<Cookie<'static>> {
        let admin = self.credentials.admin()?;

        if claimed != admin.username {
            warn!(claimed, "rejected admin claim");
            return Err(PermsError::Unauthorized);
        }

        let mut elevated = session.clone();
        for capability in Capability::ALL {
            elevated.grant(capability);
        }
        elevated.bind_owner(admin.owner());
        elevated.mark_persisted(now_secs());

        let cookie = self.cookies.save(&elevated)?;
        *session = elevated;

        info!(owner = %admin.owner(), "session established");
        Ok(cookie)
    }

    /// Whether the session was established by a valid cookie or a
    /// successful authentication.
    pub fn check_authorized(&self, session: &Session) -> bool {
        !session.is_new()
    }

    /// The owner of an authorized session.
    pub fn owner(&self, session: &Session) -> Option<OwnerId> {
        if !self.check_authorized(session) {
            return None;
        }
        session.owner().cloned()
    }

    /// Cookie that ends the client's session.
    pub fn clear(&self) -> Cookie<'static> {
        self.cookies.expire()
    }

    pub fn cookies(&self) -> &CookieStore {
        &self.cookies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie_store::CookieOptions;
    use crate::credentials::AdminIdentity;

    fn gate(credentials: CredentialStore) -> SessionGate {
        SessionGate::new(
            Arc::new(credentials),
            CookieStore::new(b"secret", CookieOptions::default()),
        )
    }

    fn alice_gate() -> SessionGate {
        gate(CredentialStore::new(AdminIdentity::new("alice")))
    }

    #[test]
    fn test_authenticate_exact_match() {
        let gate = alice_gate();
        let mut session = gate.session(std::iter::empty::<&str>());
        assert!(!gate.check_authorized(&session));

        let cookie = gate.authenticate(&mut session, "alice").unwrap();
        for cap in Capability::ALL {
            assert!(session.has(cap));
        }
        assert!(gate.check_authorized(&session));
        assert_eq!(gate.owner(&session), Some(OwnerId::new("alice")));

        // The cookie restores the same session on the next request.
        let header = format!("{}={}", cookie.name(), cookie.value());
        let restored = gate.session([header.as_str()]);
        assert!(gate.check_authorized(&restored));
        assert_eq!(gate.owner(&restored), Some(OwnerId::new("alice")));
    }

    #[test]
    fn test_mismatch_leaves_session_untouched() {
        let gate = alice_gate();
        let mut session = Session::new();
        let before = session.clone();

        for claim in ["mallory", "", "Alice", "alice ", "alic"] {
            let err = gate.authenticate(&mut session, claim).unwrap_err();
            assert!(matches!(err, PermsError::Unauthorized));
            assert_eq!(session, before);
        }
        assert!(!gate.check_authorized(&session));
        assert_eq!(gate.owner(&session), None);
    }

    #[test]
    fn test_unconfigured_admin_fails_closed() {
        let gate = gate(CredentialStore::unconfigured());
        let mut session = Session::new();
        let err = gate.authenticate(&mut session, "alice").unwrap_err();
        assert!(matches!(err, PermsError::Config(_)));
        assert!(session.is_new());
    }

    #[test]
    fn test_owner_uses_user_id() {
        let gate = gate(CredentialStore::new(
            AdminIdentity::new("alice").with_user_id("u-1"),
        ));
        let mut session = Session::new();
        gate.authenticate(&mut session, "alice").unwrap();
        assert_eq!(gate.owner(&session), Some(OwnerId::new("u-1")));
    }

    #[test]
    fn test_clear_expires_cookie() {
        let gate = alice_gate();
        let cookie = gate.clear();
        let header = format!("{}={}", cookie.name(), cookie.value());
        assert!(!gate.check_authorized(&gate.session([header.as_str()])));
    }
}
