//! Writers for the content history and the audit log.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::labels::page_label_for;
use super::types::{AuditAction, AuditLogEntry, HistoryEntry};
use crate::Result;
use crate::auth::{AccessPolicy, Resource, Role};
use crate::backend::Backend;
use crate::clock::Clock;
use crate::content::PathBuf;

/// How many audit entries [`AuditLog::recent`] returns.
pub const AUDIT_LOG_WINDOW: usize = 100;

/// Appends content history entries after successful persists.
#[derive(Clone)]
pub struct HistoryRecorder {
    backend: Arc<dyn Backend>,
    clock: Arc<dyn Clock>,
}

impl HistoryRecorder {
    pub fn new(backend: Arc<dyn Backend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Records an edit of `path`.
    pub async fn record(&self, path: &PathBuf, change_type: &str) -> Result<HistoryEntry> {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: self.clock.now_utc(),
            page: page_label_for(path).to_string(),
            section: path.to_string(),
            change_type: change_type.to_string(),
        };
        self.backend.append_history(&entry).await?;
        debug!(page = %entry.page, section = %entry.section, "Recorded content history");
        Ok(entry)
    }

    /// Entries newest-first, optionally capped.
    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        self.backend.list_history(limit).await
    }

    /// Removes every entry; only roles allowed on [`Resource::History`] may.
    pub async fn clear(&self, role: Role, policy: &AccessPolicy) -> Result<usize> {
        policy.require(Resource::History, role)?;
        let removed = self.backend.clear_history().await?;
        info!(removed, %role, "Cleared content history");
        Ok(removed)
    }
}

/// Appends and lists authentication audit entries.
#[derive(Clone)]
pub struct AuditLog {
    backend: Arc<dyn Backend>,
    clock: Arc<dyn Clock>,
}

impl AuditLog {
    pub fn new(backend: Arc<dyn Backend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    pub async fn record(&self, username: &str, action: AuditAction) -> Result<AuditLogEntry> {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            timestamp: self.clock.now_utc(),
            username: username.to_string(),
            action,
        };
        self.backend.append_audit(&entry).await?;
        Ok(entry)
    }

    /// The newest [`AUDIT_LOG_WINDOW`] entries, newest first.
    pub async fn recent(&self) -> Result<Vec<AuditLogEntry>> {
        self.backend.list_audit(AUDIT_LOG_WINDOW).await
    }
}
