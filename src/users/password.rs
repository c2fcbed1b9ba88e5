use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::error;

/// Failures from the credential hasher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    /// The stored value is not a parseable PHC hash string.
    #[error("stored password hash is malformed")]
    InvalidHashFormat,

    /// Hashing the plaintext failed.
    #[error("failed to hash password")]
    Hash,
}

/// Seam over password hashing, so flows that only orchestrate hashing can be
/// tested without paying for a real Argon2 run.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext with a freshly generated random salt. Two calls with
    /// the same plaintext produce different strings.
    fn hash(&self, plain: &str) -> Result<String, PasswordError>;

    /// Check a plaintext against a stored hash. `Ok(false)` means the hash
    /// parsed but the plaintext does not match.
    fn verify(&self, plain: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id with the crate's default parameters, producing PHC strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                PasswordError::Hash
            })?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            PasswordError::InvalidHashFormat
        })?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}
