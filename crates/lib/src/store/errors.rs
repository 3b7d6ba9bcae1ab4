//! Error types for building a content store.
//!
//! Edits never fail with an error; they report an
//! [`UpdateOutcome`](super::UpdateOutcome). These errors come from setting
//! the store up.

use thiserror::Error;

/// Errors raised while configuring a [`ContentStore`](super::ContentStore).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The defaults tree is not a map.
    #[error("Defaults tree must be a map, found {found}")]
    InvalidDefaults { found: &'static str },

    /// A defaults file could not be read.
    #[error("Failed to read defaults from {path}")]
    DefaultsFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A defaults file is not valid JSON.
    #[error("Defaults file {path} is not valid JSON")]
    DefaultsParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Check if this error concerns the defaults tree.
    pub fn is_defaults_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidDefaults { .. }
                | StoreError::DefaultsFile { .. }
                | StoreError::DefaultsParse { .. }
        )
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
