//! The configured administrator identity.

use cloudfiles_core::OwnerId;
use serde::{Deserialize, Serialize};

use crate::error::{PermsError, Result};

/// Identity record of the administrator.
///
/// Parsed from JSON such as `{"username":"alice","user_id":"u-1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    #[serde(alias = "Username")]
    pub username: String,

    /// Owner id for files created by this identity. Defaults to the
    /// username.
    #[serde(
        default,
        alias = "UserID",
        alias = "userId",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,
}

impl AdminIdentity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            user_id: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Parse and validate an identity record.
    pub fn from_json(json: &str) -> Result<Self> {
        let identity: AdminIdentity =
            serde_json::from_str(json).map_err(|e| PermsError::Config(e.to_string()))?;

        if identity.username.is_empty() {
            return Err(PermsError::Config("username is empty".into()));
        }
        if identity.user_id.as_deref() == Some("") {
            return Err(PermsError::Config("user_id is empty".into()));
        }
        Ok(identity)
    }

    /// The owner files of this identity belong to.
    pub fn owner(&self) -> OwnerId {
        OwnerId::new(self.user_id.as_deref().unwrap_or(&self.username))
    }
}

/// Read-only source of the administrator identity, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    admin: Option<AdminIdentity>,
}

impl CredentialStore {
    pub fn new(admin: AdminIdentity) -> Self {
        Self { admin: Some(admin) }
    }

    /// A store without an administrator. Every authentication fails closed.
    pub fn unconfigured() -> Self {
        Self { admin: None }
    }

    pub fn is_configured(&self) -> bool {
        self.admin.is_some()
    }

    /// The administrator identity.
    pub fn admin(&self) -> Result<&AdminIdentity> {
        self.admin
            .as_ref()
            .ok_or_else(|| PermsError::Config("no admin user configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identity() {
        let admin = AdminIdentity::from_json(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(admin.username, "alice");
        assert_eq!(admin.owner(), OwnerId::new("alice"));

        let admin = AdminIdentity::from_json(r#"{"Username":"bob","UserID":"u-7"}"#).unwrap();
        assert_eq!(admin, AdminIdentity::new("bob").with_user_id("u-7"));
        assert_eq!(admin.owner(), OwnerId::new("u-7"));
    }

    #[test]
    fn test_reject_malformed_identity() {
        for json in ["", "not json", "{}", r#"{"username":""}"#, r#"{"username":"a","user_id":""}"#] {
            let err = AdminIdentity::from_json(json).unwrap_err();
            assert!(matches!(err, PermsError::Config(_)), "{json}");
        }
    }

    #[test]
    fn test_unconfigured_fails_closed() {
        let store = CredentialStore::unconfigured();
        assert!(!store.is_configured());
        assert!(matches!(store.admin(), Err(PermsError::Config(_))));
    }
}
