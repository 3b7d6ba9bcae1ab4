//! Persistence operations for InMemory database
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory database state to/from JSON files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::InMemory;
use crate::{
    Error, Result,
    auth::Account,
    backend::{ConfigRow, errors::BackendError},
    history::{AuditLogEntry, HistoryEntry},
};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// Serializable version of InMemory database for persistence
#[derive(Serialize, Deserialize)]
struct SerializableDatabase {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    /// Config rows as a list; JSON object keys cannot be integers
    #[serde(default)]
    config: Vec<ConfigRow>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
    #[serde(default)]
    audit: Vec<AuditLogEntry>,
    #[serde(default)]
    accounts: Vec<Account>,
}

impl From<SerializableDatabase> for InMemory {
    fn from(serializable: SerializableDatabase) -> Self {
        InMemory {
            config: RwLock::new(
                serializable
                    .config
                    .into_iter()
                    .map(|row| (row.id, row.content))
                    .collect(),
            ),
            history: RwLock::new(serializable.history),
            audit: RwLock::new(serializable.audit),
            accounts: RwLock::new(
                serializable
                    .accounts
                    .into_iter()
                    .map(|account| (account.username.clone(), account))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }
}

/// Saves every table to a specified file as JSON.
pub(crate) async fn save_to_file<P: AsRef<Path>>(backend: &InMemory, path: P) -> Result<()> {
    let config = backend
        .config
        .read()
        .await
        .iter()
        .map(|(id, content)| ConfigRow {
            id: *id,
            content: content.clone(),
        })
        .collect();
    let history = backend.history.read().await.clone();
    let audit = backend.audit.read().await.clone();
    let accounts = backend.accounts.read().await.values().cloned().collect();

    let serializable = SerializableDatabase {
        version: PERSISTENCE_VERSION,
        config,
        history,
        audit,
        accounts,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| -> Error { BackendError::FileIo { source: e }.into() })
}

/// Loads the database state from a specified JSON file.
///
/// If the file does not exist, a new, empty `InMemory` database is returned.
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let database: SerializableDatabase = serde_json::from_str(&json).map_err(|e| -> Error {
                BackendError::DeserializationFailed { source: e }.into()
            })?;
            Ok(database.into())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(BackendError::FileIo { source: e }.into()),
    }
}
