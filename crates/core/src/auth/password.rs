//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings, so the salt and parameters travel
//! with the hash and can be upgraded without a schema change.

use argon2::{
    Argon2,
    password_hash::{Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Errors produced while hashing or verifying passwords.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing failed.
    #[error("failed to hash password: {0}")]
    Hash(HashError),

    /// The stored hash is not a valid PHC string.
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(HashError),
}

/// Hashes a plaintext password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if the underlying hasher fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;
    Ok(hash.to_string())
}

/// Verifies a plaintext password against a stored PHC hash string.
///
/// A mismatch is `Ok(false)`, not an error; only a malformed stored
/// hash is reported as an error.
///
/// # Errors
///
/// Returns [`PasswordError::MalformedHash`] if `stored_hash` cannot be
/// parsed as a PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(PasswordError::MalformedHash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(err) => Err(PasswordError::MalformedHash(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("rahasia-kantor").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("rahasia-kantor", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = hash_password("rahasia-kantor").unwrap();
        assert!(!verify_password("tebakan-salah", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("sama-persis").unwrap();
        let b = hash_password("sama-persis").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }
}
