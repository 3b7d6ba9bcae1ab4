//! Table operations for SQL backends.
//!
//! Content documents are stored as JSON text, timestamps as milliseconds
//! since the Unix epoch and ids as hyphenated UUID strings.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::Result;
use crate::auth::{Account, Role};
use crate::backend::errors::BackendError;
use crate::backend::{ConfigRow, RowId};
use crate::content::Value;
use crate::history::{AuditAction, AuditLogEntry, HistoryEntry};

use super::{SqlxBackend, SqlxResultExt};

fn parse_timestamp(table: &'static str, millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| {
            BackendError::InvalidRecord {
                table,
                reason: format!("timestamp {millis} out of range"),
            }
            .into()
        })
}

fn parse_id(table: &'static str, id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|e| {
        BackendError::InvalidRecord {
            table,
            reason: format!("bad id '{id}': {e}"),
        }
        .into()
    })
}

fn encode_content(content: &Value) -> Result<String> {
    serde_json::to_string(content)
        .map_err(|e| BackendError::SerializationFailed { source: e }.into())
}

/// Fetch the lowest-id configuration row.
pub async fn fetch_config(backend: &SqlxBackend) -> Result<Option<ConfigRow>> {
    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT id, content FROM site_config ORDER BY id LIMIT 1")
            .fetch_optional(backend.pool())
            .await
            .sql_context("Failed to fetch site config")?;

    match row {
        Some((id, json)) => {
            let content: Value = serde_json::from_str(&json)
                .map_err(|e| BackendError::DeserializationFailed { source: e })?;
            Ok(Some(ConfigRow {
                id: RowId(id),
                content,
            }))
        }
        None => Ok(None),
    }
}

/// Insert a configuration row and return its id.
pub async fn insert_config(backend: &SqlxBackend, content: &Value) -> Result<RowId> {
    let json = encode_content(content)?;
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO site_config (content) VALUES ($1) RETURNING id")
            .bind(json)
            .fetch_one(backend.pool())
            .await
            .sql_context("Failed to insert site config")?;
    Ok(RowId(id))
}

/// Replace the document of an existing row.
pub async fn update_config(backend: &SqlxBackend, id: RowId, content: &Value) -> Result<()> {
    let json = encode_content(content)?;
    let result = sqlx::query("UPDATE site_config SET content = $1 WHERE id = $2")
        .bind(json)
        .bind(id.0)
        .execute(backend.pool())
        .await
        .sql_context("Failed to update site config")?;

    if result.rows_affected() == 0 {
        return Err(BackendError::ConfigRowNotFound { id }.into());
    }
    Ok(())
}

pub async fn append_history(backend: &SqlxBackend, entry: &HistoryEntry) -> Result<()> {
    sqlx::query(
        "INSERT INTO content_history (id, timestamp, page, section, change_type)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(entry.id.to_string())
    .bind(entry.timestamp.timestamp_millis())
    .bind(&entry.page)
    .bind(&entry.section)
    .bind(&entry.change_type)
    .execute(backend.pool())
    .await
    .sql_context("Failed to append content history")?;
    Ok(())
}

pub async fn list_history(backend: &SqlxBackend, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
    const SELECT: &str = "SELECT id, timestamp, page, section, change_type FROM content_history
                          ORDER BY timestamp DESC, seq DESC";

    let sql = match limit {
        Some(_) => format!("{SELECT} LIMIT $1"),
        None => SELECT.to_string(),
    };
    let mut query = sqlx::query_as::<sqlx::Any, (String, i64, String, String, String)>(&sql);
    if let Some(limit) = limit {
        query = query.bind(limit as i64);
    }
    let rows = query
        .fetch_all(backend.pool())
        .await
        .sql_context("Failed to list content history")?;

    rows.into_iter()
        .map(|(id, timestamp, page, section, change_type)| -> Result<HistoryEntry> {
            Ok(HistoryEntry {
                id: parse_id("content_history", &id)?,
                timestamp: parse_timestamp("content_history", timestamp)?,
                page,
                section,
                change_type,
            })
        })
        .collect()
}

pub async fn clear_history(backend: &SqlxBackend) -> Result<usize> {
    let result = sqlx::query("DELETE FROM content_history")
        .execute(backend.pool())
        .await
        .sql_context("Failed to clear content history")?;
    Ok(result.rows_affected() as usize)
}

pub async fn append_audit(backend: &SqlxBackend, entry: &AuditLogEntry) -> Result<()> {
    sqlx::query(
        "INSERT INTO audit_log (id, timestamp, username, action)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(entry.id.to_string())
    .bind(entry.timestamp.timestamp_millis())
    .bind(&entry.username)
    .bind(entry.action.as_str())
    .execute(backend.pool())
    .await
    .sql_context("Failed to append audit entry")?;
    Ok(())
}

pub async fn list_audit(backend: &SqlxBackend, limit: usize) -> Result<Vec<AuditLogEntry>> {
    let rows: Vec<(String, i64, String, String)> = sqlx::query_as(
        "SELECT id, timestamp, username, action FROM audit_log
         ORDER BY timestamp DESC, seq DESC LIMIT $1",
    )
    .bind(limit as i64)
    .fetch_all(backend.pool())
    .await
    .sql_context("Failed to list audit log")?;

    rows.into_iter()
        .map(|(id, timestamp, username, action)| -> Result<AuditLogEntry> {
            let action: AuditAction =
                action
                    .parse()
                    .map_err(|reason| BackendError::InvalidRecord {
                        table: "audit_log",
                        reason,
                    })?;
            Ok(AuditLogEntry {
                id: parse_id("audit_log", &id)?,
                timestamp: parse_timestamp("audit_log", timestamp)?,
                username,
                action,
            })
        })
        .collect()
}

fn account_from_row(username: String, role: String, password_hash: String) -> Result<Account> {
    let role: Role = role.parse().map_err(|e| BackendError::InvalidRecord {
        table: "accounts",
        reason: format!("{e}"),
    })?;
    Ok(Account {
        username,
        role,
        password_hash,
    })
}

pub async fn get_account(backend: &SqlxBackend, username: &str) -> Result<Option<Account>> {
    let row: Option<(String, String, String)> = sqlx::query_as(
        "SELECT username, role, password_hash FROM accounts WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(backend.pool())
    .await
    .sql_context("Failed to get account")?;

    row.map(|(username, role, hash)| account_from_row(username, role, hash))
        .transpose()
}

pub async fn put_account(backend: &SqlxBackend, account: &Account) -> Result<()> {
    // Insert or update (different syntax for SQLite vs Postgres)
    let sql = if backend.is_sqlite() {
        "INSERT OR REPLACE INTO accounts (username, role, password_hash) VALUES ($1, $2, $3)"
    } else {
        "INSERT INTO accounts (username, role, password_hash) VALUES ($1, $2, $3)
         ON CONFLICT (username) DO UPDATE SET
            role = EXCLUDED.role,
            password_hash = EXCLUDED.password_hash"
    };

    sqlx::query(sql)
        .bind(&account.username)
        .bind(account.role.as_str())
        .bind(&account.password_hash)
        .execute(backend.pool())
        .await
        .sql_context("Failed to store account")?;
    Ok(())
}

pub async fn list_accounts(backend: &SqlxBackend) -> Result<Vec<Account>> {
    let rows: Vec<(String, String, String)> =
        sqlx::query_as("SELECT username, role, password_hash FROM accounts ORDER BY username")
            .fetch_all(backend.pool())
            .await
            .sql_context("Failed to list accounts")?;

    rows.into_iter()
        .map(|(username, role, hash)| account_from_row(username, role, hash))
        .collect()
}
