//! Session state.
//!
//! A session is the decoded content of the session cookie. Handlers can read
//! it, but only the gate can change it: every setter is crate-private.

use std::collections::BTreeMap;

use cloudfiles_core::OwnerId;
use serde::{Deserialize, Serialize};

use crate::capability::Capability;

/// The values persisted inside the session cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionValues {
    #[serde(default)]
    pub(crate) capabilities: BTreeMap<Capability, bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) owner: Option<OwnerId>,
}

/// A client session.
///
/// A session is *new* when no valid cookie established it. New sessions
/// carry no capabilities and no owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    values: SessionValues,

    /// Unix seconds at which the session was last persisted.
    issued_at: u64,

    is_new: bool,
}

impl Session {
    /// A fresh, anonymous session.
    pub(crate) fn new() -> Self {
        Self {
            values: SessionValues::default(),
            issued_at: 0,
            is_new: true,
        }
    }

    /// A session restored from a verified cookie.
    pub(crate) fn restored(values: SessionValues, issued_at: u64) -> Self {
        Self {
            values,
            issued_at,
            is_new: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Whether the capability is granted.
    pub fn has(&self, capability: Capability) -> bool {
        self.values
            .capabilities
            .get(&capability)
            .copied()
            .unwrap_or(false)
    }

    /// Every capability flag stored in the session.
    pub fn capabilities(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.values.capabilities.iter().map(|(c, v)| (*c, *v))
    }

    /// The owner bound at authentication, if any.
    pub fn owner(&self) -> Option<&OwnerId> {
        self.values.owner.as_ref()
    }

    pub fn issued_at(&self) -> u64 {
        self.issued_at
    }

    pub(crate) fn values(&self) -> &SessionValues {
        &self.values
    }

    pub(crate) fn grant(&mut self, capability: Capability) {
        self.values.capabilities.insert(capability, true);
    }

    pub(crate) fn bind_owner(&mut self, owner: OwnerId) {
        self.values.owner = Some(owner);
    }

    /// Record that the session was persisted at `now`.
    pub(crate) fn mark_persisted(&mut self, now: u64) {
        self.issued_at = now;
        self.is_new = false;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
