//! Core identity types shared across the service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, provider-assigned subject identifier.
///
/// Stable for the lifetime of the external identity. Never empty when part
/// of a valid identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Caller role driving every authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Role {
    Admin,
    Staff,
    Client,
    /// Role strings from the store that the service does not recognize.
    /// Authorizes nothing; the raw value is kept so a write-back never
    /// destroys it.
    Unknown(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Client => "client",
            Role::Unknown(raw) => raw,
        }
    }

    /// Parse a stored role string, treating anything unrecognized as
    /// [`Role::Unknown`] rather than erroring.
    pub fn parse(s: &str) -> Role {
        match s {
            "admin" => Role::Admin,
            "staff" => Role::Staff,
            "client" => Role::Client,
            _ => Role::Unknown(s.to_string()),
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Client
    }
}

impl From<Role> for String {
    fn from(role: Role) -> String {
        role.as_str().to_string()
    }
}

impl From<String> for Role {
    fn from(s: String) -> Role {
        Role::parse(&s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
