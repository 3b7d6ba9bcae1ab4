//! Backend trait tests
//!
//! These run against whichever backend `TEST_BACKEND` selects, so the same
//! expectations hold for InMemory, SQLite and PostgreSQL.

mod logs;

use chrono::{DateTime, TimeZone, Utc};
use sitecms::history::{AuditAction, AuditLogEntry, HistoryEntry};
use uuid::Uuid;

/// A millisecond-precision timestamp, matching what SQL backends store.
pub fn at(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).unwrap()
}

pub fn history_entry(millis: i64, section: &str) -> HistoryEntry {
    HistoryEntry {
        id: Uuid::new_v4(),
        timestamp: at(millis),
        page: "About".to_string(),
        section: section.to_string(),
        change_type: "Text Update".to_string(),
    }
}

pub fn audit_entry(millis: i64, username: &str, action: AuditAction) -> AuditLogEntry {
    AuditLogEntry {
        id: Uuid::new_v4(),
        timestamp: at(millis),
        username: username.to_string(),
        action,
    }
}
