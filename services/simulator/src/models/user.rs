//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SimulatorError;

/// Kind of account a user registered with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Researcher,
    Citizen,
}

impl AccountKind {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Researcher => "researcher",
            AccountKind::Citizen => "citizen",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "researcher" => Ok(AccountKind::Researcher),
            "citizen" => Ok(AccountKind::Citizen),
            other => Err(SimulatorError::InvalidInput(format!(
                "Unknown account kind: {}",
                other
            ))),
        }
    }
}

/// User entity
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub kind: AccountKind,
    pub external_identity: bool,
    pub created_at: DateTime<Utc>,
}

/// New user registration payload, carrying the plaintext password until the
/// store hashes it
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub kind: AccountKind,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("kind", &self.kind)
            .finish()
    }
}

/// Profile handed over by an external identity provider
#[derive(Debug, Clone)]
pub struct ExternalProfile {
    pub email: String,
    pub name: String,
    pub kind: AccountKind,
}
