//! In-memory database backend implementation
//!
//! This module provides an in-memory implementation of the [`Backend`] trait,
//! suitable for testing, development, or single-node deployments where the
//! state is saved to a JSON file on shutdown.

mod persistence;

use std::any::Any;
use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::auth::Account;
use crate::backend::errors::BackendError;
use crate::backend::{Backend, ConfigRow, RowId};
use crate::content::Value;
use crate::history::{AuditLogEntry, HistoryEntry};

/// A simple in-memory database.
///
/// Each table sits behind its own lock. It provides basic persistence
/// capabilities via `save_to_file` and `load_from_file`, serializing all
/// tables to JSON.
///
/// **Security Note**: Account password hashes are written to the JSON file
/// as-is. Protect the data directory accordingly.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) config: RwLock<BTreeMap<RowId, Value>>,
    pub(crate) history: RwLock<Vec<HistoryEntry>>,
    pub(crate) audit: RwLock<Vec<AuditLogEntry>>,
    pub(crate) accounts: RwLock<BTreeMap<String, Account>>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves every table to `path` as JSON.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads the database state from a JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` database is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl Backend for InMemory {
    async fn fetch_config(&self) -> Result<Option<ConfigRow>> {
        let config = self.config.read().await;
        Ok(config.first_key_value().map(|(id, content)| ConfigRow {
            id: *id,
            content: content.clone(),
        }))
    }

    async fn insert_config(&self, content: &Value) -> Result<RowId> {
        let mut config = self.config.write().await;
        let id = RowId(config.last_key_value().map_or(1, |(id, _)| id.0 + 1));
        config.insert(id, content.clone());
        Ok(id)
    }

    async fn update_config(&self, id: RowId, content: &Value) -> Result<()> {
        let mut config = self.config.write().await;
        match config.get_mut(&id) {
            Some(slot) => {
                *slot = content.clone();
                Ok(())
            }
            None => Err(BackendError::ConfigRowNotFound { id }.into()),
        }
    }

    async fn append_history(&self, entry: &HistoryEntry) -> Result<()> {
        self.history.write().await.push(entry.clone());
        Ok(())
    }

    async fn list_history(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        let history = self.history.read().await;
        let mut entries: Vec<HistoryEntry> = history.iter().rev().cloned().collect();
        // Stable: ties keep reverse insertion order
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    async fn clear_history(&self) -> Result<usize> {
        let mut history = self.history.write().await;
        let removed = history.len();
        history.clear();
        Ok(removed)
    }

    async fn append_audit(&self, entry: &AuditLogEntry) -> Result<()> {
        self.audit.write().await.push(entry.clone());
        Ok(())
    }

    async fn list_audit(&self, limit: usize) -> Result<Vec<AuditLogEntry>> {
        let audit = self.audit.read().await;
        let mut entries: Vec<AuditLogEntry> = audit.iter().rev().cloned().collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn get_account(&self, username: &str) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn put_account(&self, account: &Account) -> Result<()> {
        self.accounts
            .write()
            .await
            .insert(account.username.clone(), account.clone());
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.read().await.values().cloned().collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
