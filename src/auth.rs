//! Password hashing
//!
//! Salted argon2 hashing for account passwords. Stored values are PHC strings
//! (`$argon2id$v=19$...`), so parameters travel with each hash.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::store::StoreResult;

/// Hashes and verifies account passwords
#[derive(Clone, Default)]
pub struct PasswordService {
    hasher: Arc<Argon2<'static>>,
}

impl PasswordService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, password: &str) -> StoreResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.hasher.hash_password(password.as_bytes(), &salt)?;

        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored PHC hash.
    ///
    /// A mismatch is `Ok(false)`; only an unparseable stored hash is an error.
    pub fn verify(&self, password_hash: &str, password: &str) -> StoreResult<bool> {
        let parsed = PasswordHash::new(password_hash)?;

        Ok(self
            .hasher
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let passwords = PasswordService::new();

        let hash = passwords.hash("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(passwords.verify(&hash, "hunter2").unwrap());
        assert!(!passwords.verify(&hash, "Hunter2").unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let passwords = PasswordService::new();

        let first = passwords.hash("same").unwrap();
        let second = passwords.hash("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_corrupt_hash_is_an_error() {
        let passwords = PasswordService::new();
        assert!(passwords.verify("plaintext-from-an-old-import", "x").is_err());
    }
}
