//! Named session privileges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A boolean privilege flag carried by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Administrative access.
    Admin,
    /// SQL console access.
    Sql,
    /// Command execution access.
    Cmd,
}

impl Capability {
    /// Every capability, in the order they are granted.
    pub const ALL: [Capability; 3] = [Capability::Admin, Capability::Sql, Capability::Cmd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Admin => "admin",
            Capability::Sql => "sql",
            Capability::Cmd => "cmd",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
