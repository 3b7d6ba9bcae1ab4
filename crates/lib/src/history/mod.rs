//! Content history and authentication audit trail.
//!
//! A history entry is appended once per persisted edit, after the remote
//! write succeeded. Audit entries are appended on every login and logout.
//! Both lists are read newest-first.

pub mod labels;
pub mod recorder;
pub mod types;

pub use labels::{UNKNOWN_PAGE, page_label};
pub use recorder::{AUDIT_LOG_WINDOW, AuditLog, HistoryRecorder};
pub use types::{AuditAction, AuditLogEntry, HistoryEntry};
