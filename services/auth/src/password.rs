//! Password hashing with Argon2id

use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher as _, SaltString},
};
use thiserror::Error;

/// Hashing failed, usually because of invalid Argon2 parameters
#[derive(Debug, Error)]
#[error("Failed to hash password: {0}")]
pub struct PasswordError(String);

/// Turns plaintext passwords into storable hashes and checks them
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// False for a wrong password as well as for an unparsable hash
    fn verify(&self, hash: &str, plaintext: &str) -> bool;
}

/// Argon2id with the crate's default parameters and a random salt per hash
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, hash: &str, plaintext: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
