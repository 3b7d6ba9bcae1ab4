//! Password hashing for operator accounts.
//!
//! Uses Argon2id with a random salt per hash; the salt is embedded in the PHC
//! string so only the hash needs storing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};

use super::errors::AuthError;

/// Hash a password using Argon2id
///
/// Returns the hash in PHC string format.
pub fn hash_password(password: impl AsRef<str>) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    Argon2::default()
        .hash_password(password.as_ref().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHashing {
            reason: e.to_string(),
        })
}

/// Verify a password against its stored hash
///
/// A hash that cannot be parsed is treated as a mismatch.
pub fn verify_password(password: impl AsRef<str>, password_hash: impl AsRef<str>) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(password_hash.as_ref()) else {
        tracing::warn!("Stored password hash is not in PHC format");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_ref().as_bytes(), &parsed_hash)
        .is_ok()
}
