//! Authorization and credential error types.
//!
//! This module defines structured error types for role checks, operator
//! accounts and password handling.

use thiserror::Error as ThisError;

use super::types::{Resource, Role};
use crate::Error;

/// Errors that can occur during authorization and credential operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum AuthError {
    /// The role is not on the allow-list for the resource.
    #[error("Role '{role}' may not edit {resource}")]
    PermissionDenied {
        /// The role that attempted the action
        role: Role,
        /// The resource that was addressed
        resource: Resource,
    },

    /// A role name could not be parsed.
    #[error("Unknown role: {role}")]
    UnknownRole {
        /// The role string as received
        role: String,
    },

    /// Username or password did not match.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// An operation addressed an account that does not exist.
    #[error("Account not found: {username}")]
    AccountNotFound {
        /// The username that was looked up
        username: String,
    },

    /// An account with this username already exists.
    #[error("Account already exists: {username}")]
    AccountExists {
        /// The conflicting username
        username: String,
    },

    /// The username or password is not acceptable.
    #[error("Invalid account data: {reason}")]
    InvalidAccount {
        /// What was rejected
        reason: String,
    },

    /// Password hashing failed inside argon2.
    #[error("Password hashing failed: {reason}")]
    PasswordHashing {
        /// Description of the failure
        reason: String,
    },
}

impl AuthError {
    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, AuthError::PermissionDenied { .. })
    }

    /// Check if this error is a failed login.
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials)
    }

    /// Check if this error indicates the account was missing.
    pub fn is_account_not_found(&self) -> bool {
        matches!(self, AuthError::AccountNotFound { .. })
    }

    /// Check if this error indicates the account already exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, AuthError::AccountExists { .. })
    }

    /// Check if this error is caused by bad input rather than state.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AuthError::UnknownRole { .. } | AuthError::InvalidAccount { .. }
        )
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
