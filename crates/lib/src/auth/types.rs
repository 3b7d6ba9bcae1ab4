//! Core types for operator authorization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::AuthError;

/// Operator role.
///
/// Roles are flat labels rather than a hierarchy; what each one may touch is
/// decided by the [`AccessPolicy`](super::AccessPolicy) allow-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Site owner; may do everything
    Master,
    /// Full administrator including account management
    SuperAdmin,
    /// Content editor
    Admin,
    /// Human resources; edits job listings only
    Hr,
    /// Read-only access to the editor
    Viewer,
}

impl Role {
    /// All roles, most privileged first.
    pub const ALL: [Role; 5] = [
        Role::Master,
        Role::SuperAdmin,
        Role::Admin,
        Role::Hr,
        Role::Viewer,
    ];

    /// Stable lowercase name, as stored and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::SuperAdmin => "superadmin",
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AuthError::UnknownRole {
                role: s.to_string(),
            })
    }
}

/// A protected area of the site that roles are granted access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Page content, images and settings
    Content,
    /// Operator accounts
    Credentials,
    /// The careers section
    JobListings,
    /// The content history log
    History,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Content => "content",
            Resource::Credentials => "credentials",
            Resource::JobListings => "job listings",
            Resource::History => "history",
        };
        f.write_str(name)
    }
}

/// An operator account as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub role: Role,
    /// Argon2 hash in PHC string format
    pub password_hash: String,
}

/// An authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
}
