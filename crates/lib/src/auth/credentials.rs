//! Operator accounts and login.
//!
//! [`CredentialStore`] keeps accounts in the backend, checks passwords and
//! writes a login/logout entry to the audit log for every successful session
//! change. Failed logins are not audited; they are logged at `warn`.

use std::sync::Arc;

use tracing::{info, warn};

use super::crypto::{hash_password, verify_password};
use super::errors::AuthError;
use super::policy::AccessPolicy;
use super::types::{Account, Resource, Role, Session};
use crate::Result;
use crate::backend::Backend;
use crate::history::{AuditAction, AuditLog};

/// Operator account management and authentication.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn Backend>,
    audit: AuditLog,
    policy: Arc<AccessPolicy>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn Backend>, audit: AuditLog, policy: Arc<AccessPolicy>) -> Self {
        Self {
            backend,
            audit,
            policy,
        }
    }

    /// The audit log login and logout events go to.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Creates the master account if no account exists yet.
    ///
    /// Returns whether an account was created.
    pub async fn bootstrap_master(&self, username: &str, password: &str) -> Result<bool> {
        if !self.backend.list_accounts().await?.is_empty() {
            return Ok(false);
        }
        self.insert(username, password, Role::Master).await?;
        info!(username, "Created initial master account");
        Ok(true)
    }

    /// Creates an account on behalf of an operator with `actor` role.
    pub async fn create_account(
        &self,
        actor: Role,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<()> {
        self.policy.require(Resource::Credentials, actor)?;
        if self.backend.get_account(username).await?.is_some() {
            return Err(AuthError::AccountExists {
                username: username.to_string(),
            }
            .into());
        }
        self.insert(username, password, role).await?;
        info!(username, %role, %actor, "Created account");
        Ok(())
    }

    /// Changes a password.
    ///
    /// Operators may always change their own password; changing someone
    /// else's requires access to credentials.
    pub async fn change_password(
        &self,
        actor: &Session,
        username: &str,
        new_password: &str,
    ) -> Result<()> {
        if actor.username != username {
            self.policy.require(Resource::Credentials, actor.role)?;
        }
        validate_password(new_password)?;
        let mut account =
            self.backend
                .get_account(username)
                .await?
                .ok_or_else(|| AuthError::AccountNotFound {
                    username: username.to_string(),
                })?;
        account.password_hash = hash_password(new_password)?;
        self.backend.put_account(&account).await?;
        info!(username, actor = %actor.username, "Password changed");
        Ok(())
    }

    /// Lists usernames and roles for operators allowed to see credentials.
    pub async fn list_accounts(&self, actor: Role) -> Result<Vec<(String, Role)>> {
        self.policy.require(Resource::Credentials, actor)?;
        Ok(self
            .backend
            .list_accounts()
            .await?
            .into_iter()
            .map(|account| (account.username, account.role))
            .collect())
    }

    /// Checks a username and password and opens a session.
    ///
    /// Returns `None` when the account is unknown or the password does not
    /// match. On success a [`AuditAction::Login`] entry is recorded; an audit
    /// failure is logged and does not fail the login.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<Session>> {
        let account = self.backend.get_account(username).await?;
        let Some(account) = account.filter(|a| verify_password(password, &a.password_hash))
        else {
            warn!(username, "Rejected login");
            return Ok(None);
        };

        if let Err(e) = self.audit.record(&account.username, AuditAction::Login).await {
            warn!(username, error = %e, "Failed to record login in audit log");
        }
        info!(username, role = %account.role, "Operator logged in");
        Ok(Some(Session {
            username: account.username,
            role: account.role,
        }))
    }

    /// Ends a session, recording a [`AuditAction::Logout`] entry.
    pub async fn logout(&self, session: &Session) -> Result<()> {
        self.audit
            .record(&session.username, AuditAction::Logout)
            .await?;
        info!(username = %session.username, "Operator logged out");
        Ok(())
    }

    async fn insert(&self, username: &str, password: &str, role: Role) -> Result<()> {
        validate_username(username)?;
        validate_password(password)?;
        let account = Account {
            username: username.to_string(),
            role,
            password_hash: hash_password(password)?,
        };
        self.backend.put_account(&account).await
    }
}

fn validate_username(username: &str) -> std::result::Result<(), AuthError> {
    if username.trim().is_empty() || username.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidAccount {
            reason: "username must be non-empty and contain no whitespace".to_string(),
        });
    }
    Ok(())
}

fn validate_password(password: &str) -> std::result::Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::InvalidAccount {
            reason: "password must not be empty".to_string(),
        });
    }
    Ok(())
}
