//! Persistence backends for the site content.
//!
//! The [`Backend`] trait is the remote store the content store talks to:
//!
//! - a single-row configuration table holding the whole content tree as one
//!   JSON document, read once at start and replaced wholesale on every edit
//! - an append-only content history table, bulk-clearable
//! - an append-only authentication audit log
//! - operator accounts for the credentials gate
//!
//! Two implementations are provided: [`InMemory`] (optionally saved to a JSON
//! file) and [`SqlxBackend`] for SQLite and PostgreSQL.

use std::any::Any;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::auth::Account;
use crate::content::Value;
use crate::history::{AuditLogEntry, HistoryEntry};

pub mod database;
pub mod errors;

pub use database::InMemory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub use database::{DbKind, SqlxBackend};
pub use errors::BackendError;

/// Surrogate identity of the configuration row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub i64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The stored configuration row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRow {
    pub id: RowId,
    pub content: Value,
}

/// Storage abstraction behind the content store.
///
/// All implementations must be `Send` and `Sync` so the store can hand the
/// backend to background persistence tasks, and implement `Any` to allow
/// downcasting (the binary saves an [`InMemory`] backend on shutdown).
#[async_trait]
pub trait Backend: Send + Sync + Any {
    /// Fetches the configuration row, if one exists.
    ///
    /// The table is expected to hold at most one row; if more exist the one
    /// with the lowest id is returned.
    async fn fetch_config(&self) -> Result<Option<ConfigRow>>;

    /// Inserts a new configuration row and returns its id.
    async fn insert_config(&self, content: &Value) -> Result<RowId>;

    /// Replaces the whole document of the row `id`.
    ///
    /// Returns `BackendError::ConfigRowNotFound` if the row does not exist.
    async fn update_config(&self, id: RowId, content: &Value) -> Result<()>;

    /// Appends a content history entry.
    async fn append_history(&self, entry: &HistoryEntry) -> Result<()>;

    /// Lists history entries newest-first, optionally capped.
    async fn list_history(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>>;

    /// Removes every history entry, returning how many were removed.
    async fn clear_history(&self) -> Result<usize>;

    /// Appends an authentication audit entry.
    async fn append_audit(&self, entry: &AuditLogEntry) -> Result<()>;

    /// Lists audit entries newest-first, capped at `limit`.
    async fn list_audit(&self, limit: usize) -> Result<Vec<AuditLogEntry>>;

    /// Looks up an operator account by username.
    async fn get_account(&self, username: &str) -> Result<Option<Account>>;

    /// Inserts or replaces an operator account.
    async fn put_account(&self, account: &Account) -> Result<()>;

    /// Lists all operator accounts ordered by username.
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Returns a reference to the backend as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
