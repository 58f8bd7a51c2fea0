//! Password Hashing Capability
//!
//! The login flow that precedes session creation verifies credentials
//! through the [`PasswordHasher`] capability. The session crate never sees
//! clear text passwords; it only receives an already-verified user.
//!
//! [`Argon2Hasher`] is the production implementation:
//! - Argon2id with OWASP default parameters (m=19456, t=2, p=1)
//! - NFKC normalization before hashing
//! - Optional application-wide pepper
//! - Working copies of the secret are zeroized after use

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored value is not a PHC string
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Hash/verify capability injected into the login flow
pub trait PasswordHasher: Send + Sync {
    /// Hash a clear text password into a storable PHC string
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check a clear text password against a stored PHC string.
    ///
    /// `Ok(false)` means "wrong password"; `Err` means the stored hash is unusable.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordHashError>;
}

/// Argon2id implementation of [`PasswordHasher`]
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    pepper: Option<Zeroizing<Vec<u8>>>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher that appends an application-wide secret before hashing
    pub fn with_pepper(pepper: impl Into<Vec<u8>>) -> Self {
        Self {
            pepper: Some(Zeroizing::new(pepper.into())),
        }
    }

    /// NFKC-normalized password bytes, with the pepper appended
    fn material(&self, password: &str) -> Zeroizing<Vec<u8>> {
        let normalized: Zeroizing<String> = Zeroizing::new(password.nfkc().collect());
        let mut bytes = Zeroizing::new(normalized.as_bytes().to_vec());
        if let Some(pepper) = &self.pepper {
            bytes.extend_from_slice(pepper);
        }
        bytes
    }

    /// Whether a stored hash was produced by something other than Argon2id
    pub fn needs_rehash(stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed.algorithm != argon2::Algorithm::Argon2id.ident(),
            Err(_) => true,
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let material = self.material(password);
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(&material, &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        let material = self.material(password);

        // Argon2 compares in constant time
        Ok(Argon2::default()
            .verify_password(&material, &parsed)
            .is_ok())
    }
}

impl fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let hashed = hasher.hash("TestPassword123!").unwrap();

        assert!(hashed.starts_with("$argon2id$"));
        assert!(hasher.verify("TestPassword123!", &hashed).unwrap());
        assert!(!hasher.verify("WrongPassword123!", &hashed).unwrap());
    }

    #[test]
    fn test_pepper_must_match() {
        let peppered = Argon2Hasher::with_pepper(b"my_secret_pepper".to_vec());
        let hashed = peppered.hash("TestPassword123!").unwrap();

        assert!(peppered.verify("TestPassword123!", &hashed).unwrap());
        assert!(!Argon2Hasher::new().verify("TestPassword123!", &hashed).unwrap());
        assert!(
            !Argon2Hasher::with_pepper(b"wrong".to_vec())
                .verify("TestPassword123!", &hashed)
                .unwrap()
        );
    }

    #[test]
    fn test_nfkc_equivalent_inputs_verify() {
        let hasher = Argon2Hasher::new();
        // U+FF21 FULLWIDTH LATIN CAPITAL LETTER A normalizes to "A"
        let hashed = hasher.hash("\u{FF21}bcdefgh1").unwrap();
        assert!(hasher.verify("Abcdefgh1", &hashed).unwrap());
    }

    #[test]
    fn test_invalid_stored_hash() {
        let result = Argon2Hasher::new().verify("whatever", "not_a_valid_hash");
        assert!(matches!(result, Err(PasswordHashError::InvalidHashFormat)));
        assert!(Argon2Hasher::needs_rehash("not_a_valid_hash"));
    }

    #[test]
    fn test_debug_redaction() {
        let hasher = Argon2Hasher::with_pepper(b"pepper-value".to_vec());
        let debug_output = format!("{:?}", hasher);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("pepper-value"));
    }
}
