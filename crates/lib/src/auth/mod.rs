//! Authorization for site operators
//!
//! This module provides the role allow-lists that gate every edit, password
//! hashing, and the account store used to log operators in.

pub mod credentials;
pub mod crypto;
pub mod errors;
pub mod policy;
pub mod types;

// Re-export main types for easier access
pub use credentials::CredentialStore;
pub use errors::AuthError;
pub use policy::AccessPolicy;
pub use types::*;
