use crate::types::{AppError, Result};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Argon2,
};

/// Password-hashing primitive consumed by the authentication provider.
///
/// Implementations must compare in constant time. `verify` returns `Ok(false)`
/// on a mismatch and an error only when the stored hash cannot be parsed.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a secret into a self-describing string suitable for storage.
    fn hash(&self, secret: &str) -> Result<String>;

    /// Checks a secret against a previously produced hash.
    fn verify(&self, secret: &str, hash: &str) -> Result<bool>;
}

/// Argon2id hasher producing PHC-formatted strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// Hasher with the argon2 crate's default Argon2id parameters.
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, secret: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(secret.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let hasher = Argon2Hasher::new();
        let password = "test_password_123";

        let hash = hasher.hash(password).expect("should hash password");

        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2id"), "hash should be in PHC format");
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = Argon2Hasher::new();

        let first = hasher.hash("same-password").expect("should hash");
        let second = hasher.hash("same-password").expect("should hash");

        assert_ne!(first, second, "each hash gets a fresh salt");
    }

    #[test]
    fn test_password_verification_success() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("secure_password_456").expect("should hash");

        assert!(hasher
            .verify("secure_password_456", &hash)
            .expect("should verify"));
    }

    #[test]
    fn test_password_verification_failure() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("correct_password").expect("should hash");

        assert!(!hasher.verify("wrong_password", &hash).expect("should verify"));
    }

    #[test]
    fn test_unparseable_hash_is_an_error() {
        let hasher = Argon2Hasher::new();

        assert!(hasher.verify("anything", "plaintext-not-a-hash").is_err());
    }
}
