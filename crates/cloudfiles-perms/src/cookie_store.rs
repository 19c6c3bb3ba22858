//! Signed cookie persistence for sessions.
//!
//! The whole session lives in the cookie value:
//!
//! ```text
//! base64url(CBOR{name, values, issued_at}) "." base64url(MAC)
//! ```
//!
//! The MAC is a keyed BLAKE3 hash over `name "|" payload`, keyed with a key
//! derived from the configured session secret. Nothing is kept server-side,
//! so concurrent requests see either the old or the new cookie.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use cookie::{time, Cookie, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PermsError, Result};
use crate::session::{Session, SessionValues};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "admin";

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// BLAKE3 key-derivation context for the cookie MAC key.
const KEY_CONTEXT: &str = "cloudfiles session cookie v1";

/// Attributes written on every session cookie.
#[derive(Debug, Clone)]
pub struct CookieOptions {
    /// Cookie path (default: "/").
    pub path: String,
    /// Session lifetime; also sent as `Max-Age`.
    pub ttl: Duration,
    /// Whether to set the Secure flag.
    pub secure: bool,
    /// SameSite policy.
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            ttl: DEFAULT_SESSION_TTL,
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CookiePayload {
    name: String,
    values: SessionValues,
    issued_at: u64,
}

/// Encodes sessions into signed cookies and back.
pub struct CookieStore {
    name: String,
    key: [u8; 32],
    options: CookieOptions,
}

impl CookieStore {
    /// Create a store signing with a key derived from `secret`.
    pub fn new(secret: &[u8], options: CookieOptions) -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            key: blake3::derive_key(KEY_CONTEXT, secret),
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &CookieOptions {
        &self.options
    }

    /// Resolve the session from `Cookie` header values.
    ///
    /// A missing, tampered, malformed or expired cookie yields a new
    /// anonymous session.
    pub fn load<'a, I>(&self, headers: I) -> Session
    where
        I: IntoIterator<Item = &'a str>,
    {
        let value = headers
            .into_iter()
            .flat_map(Cookie::split_parse)
            .filter_map(|c| c.ok())
            .find(|c| c.name() == self.name)
            .map(|c| c.value().to_string());

        let Some(value) = value else {
            return Session::new();
        };

        match self.decode(&value, now_secs()) {
            Ok(session) => {
                debug!(owner = ?session.owner(), "restored session from cookie");
                session
            }
            Err(e) => {
                warn!(error = %e, "discarding session cookie");
                Session::new()
            }
        }
    }

    /// Sign `session` into a cookie value.
    pub fn encode(&self, session: &Session) -> Result<String> {
        let payload = CookiePayload {
            name: self.name.clone(),
            values: session.values().clone(),
            issued_at: session.issued_at(),
        };

        let mut buf = Vec::new();
        ciborium::into_writer(&payload, &mut buf)
            .map_err(|e| PermsError::Serialization(e.to_string()))?;

        let payload = URL_SAFE_NO_PAD.encode(buf);
        let mac = self.mac(&payload);
        Ok(format!(
            "{}.{}",
            payload,
            URL_SAFE_NO_PAD.encode(mac.as_bytes())
        ))
    }

    /// Verify and decode a cookie value as of `now` (unix seconds).
    pub fn decode(&self, value: &str, now: u64) -> Result<Session> {
        let (payload, mac) = value
            .split_once('.')
            .ok_or_else(|| PermsError::InvalidCookie("missing signature".into()))?;

        let mac: [u8; 32] = URL_SAFE_NO_PAD
            .decode(mac)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| PermsError::InvalidCookie("malformed signature".into()))?;

        // blake3::Hash equality is constant-time.
        if self.mac(payload) != blake3::Hash::from(mac) {
            return Err(PermsError::InvalidCookie("signature mismatch".into()));
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| PermsError::InvalidCookie(e.to_string()))?;
        let payload: CookiePayload = ciborium::from_reader(bytes.as_slice())
            .map_err(|e| PermsError::InvalidCookie(e.to_string()))?;

        if payload.name != self.name {
            return Err(PermsError::InvalidCookie(format!(
                "cookie issued for {}",
                payload.name
            )));
        }

        if payload.issued_at.saturating_add(self.options.ttl.as_secs()) < now {
            return Err(PermsError::InvalidCookie("session expired".into()));
        }

        Ok(Session::restored(payload.values, payload.issued_at))
    }

    /// Build the `Set-Cookie` that persists `session`.
    pub fn save(&self, session: &Session) -> Result<Cookie<'static>> {
        let value = self.encode(session)?;
        let max_age = i64::try_from(self.options.ttl.as_secs()).unwrap_or(i64::MAX);

        Ok(self
            .base(value)
            .max_age(time::Duration::seconds(max_age))
            .build())
    }

    /// Build the `Set-Cookie` that removes the session from the client.
    pub fn expire(&self) -> Cookie<'static> {
        self.base(String::new())
            .max_age(time::Duration::ZERO)
            .expires(time::OffsetDateTime::UNIX_EPOCH)
            .build()
    }

    fn base(&self, value: String) -> cookie::CookieBuilder<'static> {
        Cookie::build((self.name.clone(), value))
            .path(self.options.path.clone())
            .http_only(true)
            .secure(self.options.secure)
            .same_site(self.options.same_site)
    }

    fn mac(&self, payload: &str) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(self.name.as_bytes());
        hasher.update(b"|");
        hasher.update(payload.as_bytes());
        hasher.finalize()
    }
}

/// Current time in unix seconds.
pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
