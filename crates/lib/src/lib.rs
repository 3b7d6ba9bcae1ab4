//! sitecms: the live-content store behind the hospital site.
//!
//! Every piece of text and every image reference the public site renders
//! lives in one schema-less content tree. Operators with the right role edit
//! fields in place; each edit is applied to the in-memory tree immediately
//! and then persisted to the remote store in the background.
//!
//! ## Core Concepts
//!
//! * **Content tree (`content::Value`)**: A nested map/list/scalar document
//!   addressed by dotted paths such as `about.values[0].points[2]`.
//! * **Defaults (`content::default_content`)**: The bundled tree every
//!   persisted tree is deep-merged over, so new fields always have a value.
//! * **Image indirection (`content::indirection`)**: Text values of the form
//!   `imagePaths.<group>.<name>` point at shared asset URLs.
//! * **Backends (`backend::Backend`)**: Pluggable remote storage for the
//!   configuration row, the content history and the audit log.
//! * **ContentStore (`store::ContentStore`)**: Owns the live tree, gates
//!   writes through the access policy and sequences background persistence.
//! * **Access policy (`auth::AccessPolicy`)**: Which operator roles may edit
//!   which resource.

pub mod auth;
pub mod backend;
pub mod clock;
pub mod content;
pub mod history;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use content::{Edit, PathBuf, Value};
pub use store::{ContentStore, UpdateOutcome};

/// Result type used throughout the sitecms library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the sitecms library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Path parsing and tree write errors from the content module
    #[error(transparent)]
    Path(content::PathError),

    /// Structured authorization and credential errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Store setup errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Path(_) => "content",
            Error::Auth(_) => "auth",
            Error::Backend(_) => "backend",
            Error::Store(_) => "store",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_not_found(),
            Error::Auth(auth_err) => auth_err.is_account_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_permission_denied(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_already_exists(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Check if this error is database/backend-related.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is about configuring the content store.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if this error comes from a malformed or conflicting content path.
    pub fn is_path_error(&self) -> bool {
        matches!(self, Error::Path(_))
    }
}
