//! SQL schema definitions and migrations.
//!
//! This module contains the database schema used by SQL backends.
//! Column types are portable between SQLite and Postgres; only the
//! auto-incrementing surrogate keys differ by dialect.
//!
//! # Migration System
//!
//! The migration system uses code-based migrations rather than SQL files to handle
//! dialect differences between SQLite and PostgreSQL. Each migration is a function
//! that receives the backend and can execute database-specific SQL as needed.
//!
//! ## Adding a New Migration
//!
//! 1. Increment `SCHEMA_VERSION`
//! 2. Add a new `migrate_vN_to_vM` async function
//! 3. Add the migration to the match statement in `run_migration`
//! 4. Document what the migration does

use crate::Result;
use crate::backend::errors::BackendError;

use super::{DbKind, SqlxBackend};

/// Current schema version.
///
/// Increment this when making schema changes that require migration.
pub const SCHEMA_VERSION: i64 = 1;

/// Auto-incrementing surrogate key column for the dialect.
fn serial_key(kind: DbKind) -> &'static str {
    match kind {
        DbKind::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        DbKind::Postgres => "BIGSERIAL PRIMARY KEY",
    }
}

/// SQL statements to create the schema tables.
pub fn create_tables(kind: DbKind) -> Vec<String> {
    let serial = serial_key(kind);
    vec![
        // Schema version tracking
        // BIGINT (64-bit) used for portability between SQLite and PostgreSQL
        "CREATE TABLE IF NOT EXISTS schema_version (
            version BIGINT PRIMARY KEY
        )"
        .to_string(),
        // The whole content tree as one JSON document; expected to hold one row
        format!(
            "CREATE TABLE IF NOT EXISTS site_config (
                id {serial},
                content TEXT NOT NULL
            )"
        ),
        // seq orders entries that share a millisecond timestamp
        format!(
            "CREATE TABLE IF NOT EXISTS content_history (
                seq {serial},
                id TEXT NOT NULL UNIQUE,
                timestamp BIGINT NOT NULL,
                page TEXT NOT NULL,
                section TEXT NOT NULL,
                change_type TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS audit_log (
                seq {serial},
                id TEXT NOT NULL UNIQUE,
                timestamp BIGINT NOT NULL,
                username TEXT NOT NULL,
                action TEXT NOT NULL
            )"
        ),
        "CREATE TABLE IF NOT EXISTS accounts (
            username TEXT PRIMARY KEY NOT NULL,
            role TEXT NOT NULL,
            password_hash TEXT NOT NULL
        )"
        .to_string(),
    ]
}

/// SQL statements to create indexes.
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_content_history_timestamp ON content_history(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_audit_log_timestamp ON audit_log(timestamp)",
];

/// Initialize the database schema.
///
/// Creates tables and indexes if they don't exist, and handles migrations
/// if the schema version has changed.
pub async fn initialize(backend: &SqlxBackend) -> Result<()> {
    let pool = backend.pool();

    for statement in create_tables(backend.kind()) {
        sqlx::query(&statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Schema creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    // Check current schema version
    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .map_err(|e| BackendError::SqlxError {
            reason: format!("Failed to check schema version: {e}"),
            source: Some(e),
        })?;

    if row.is_none() {
        // First initialization
        sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
            .bind(SCHEMA_VERSION)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Failed to initialize schema version: {e}"),
                source: Some(e),
            })?;
    } else if let Some((current_version,)) = row
        && current_version < SCHEMA_VERSION
    {
        migrate(backend, current_version, SCHEMA_VERSION).await?;
    }

    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Index creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    Ok(())
}

/// Run migrations sequentially from one schema version to another.
async fn migrate(backend: &SqlxBackend, from: i64, to: i64) -> Result<()> {
    tracing::info!(from, to, "Starting SQL schema migration");

    let mut current = from;
    while current < to {
        let next = current + 1;
        tracing::info!(from = current, to = next, "Running migration");

        run_migration(backend, current, next).await?;

        sqlx::query("UPDATE schema_version SET version = $1")
            .bind(next)
            .execute(backend.pool())
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Failed to update schema version to {next}: {e}"),
                source: Some(e),
            })?;

        tracing::info!(version = next, "Migration completed");
        current = next;
    }

    Ok(())
}

/// Execute a single migration step.
///
/// There are no migrations yet; reaching this means `SCHEMA_VERSION` was
/// bumped without adding one.
async fn run_migration(backend: &SqlxBackend, from: i64, to: i64) -> Result<()> {
    let _ = backend;

    Err(BackendError::SqlxError {
        reason: format!("Unknown migration path: v{from} to v{to}"),
        source: None,
    }
    .into())
}
