//! Password hashing for user accounts
//!
//! Salted SHA-256 digests stored alongside a per-user random salt, matching
//! the `users(password_hash, password_salt)` schema.
//!
//! # Pure Functions
//!
//! This module contains only pure functions - no HTTP or database
//! dependencies. Session handling lives in the web crate.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a random 16-byte salt as 32 hex characters
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with the given salt
///
/// Digest input is `salt || password`; output is 64 hex characters.
///
/// # Examples
///
/// ```
/// use hourglass_common::auth::hash_password;
///
/// let hash = hash_password("a1b2", "hunter22");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_password("a1b2", "hunter22"));
/// ```
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a candidate password against a stored salt + hash pair
pub fn verify_password(salt: &str, stored_hash: &str, candidate: &str) -> bool {
    hash_password(salt, candidate) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_is_32_hex_chars() {
        let salt = generate_salt();
        assert_eq!(salt.len(), 32);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_salts_are_unique() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn test_hash_is_deterministic() {
        let hash1 = hash_password("00ff", "correct horse");
        let hash2 = hash_password("00ff", "correct horse");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_salt_different_hash() {
        assert_ne!(
            hash_password("00ff", "correct horse"),
            hash_password("ff00", "correct horse")
        );
    }

    #[test]
    fn test_verify_accepts_correct_password() {
        let salt = generate_salt();
        let hash = hash_password(&salt, "s3cret!!");
        assert!(verify_password(&salt, &hash, "s3cret!!"));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let salt = generate_salt();
        let hash = hash_password(&salt, "s3cret!!");
        assert!(!verify_password(&salt, &hash, "s3cret!"));
        assert!(!verify_password(&salt, &hash, ""));
    }
}
