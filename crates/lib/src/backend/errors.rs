//! Error types for the persistence backends.
//!
//! This module defines structured error types for storage operations,
//! covering the configuration row, the history and audit tables, and the
//! operator accounts.

use thiserror::Error;

use super::RowId;

/// Errors that can occur during backend operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// The configuration row addressed by an update does not exist.
    #[error("Configuration row not found: {id}")]
    ConfigRowNotFound {
        /// The surrogate id that was addressed
        id: RowId,
    },

    /// A stored record could not be interpreted.
    #[error("Invalid stored record in {table}: {reason}")]
    InvalidRecord {
        /// The table the record came from
        table: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// SQL database error.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Description of what failed
        reason: String,
        /// The underlying sqlx error, if any
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl BackendError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::ConfigRowNotFound { .. })
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, BackendError::FileIo { .. })
    }

    /// Check if this error is related to (de)serialization of stored data.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
                | BackendError::InvalidRecord { .. }
        )
    }

    /// Check if this error came from the SQL driver.
    pub fn is_sql_error(&self) -> bool {
        #[cfg(any(feature = "sqlite", feature = "postgres"))]
        {
            matches!(self, BackendError::SqlxError { .. })
        }
        #[cfg(not(any(feature = "sqlite", feature = "postgres")))]
        {
            false
        }
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
