//! Argon2id password hashing.
//!
//! New hashes use m=19 MiB, t=2, p=1 and a fresh random salt. When a
//! pepper is configured it is prepended to the password on both the
//! hashing and the verification side.

use std::borrow::Cow;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier, Version};

use crate::error::AuthError;

const MEMORY_KIB: u32 = 19 * 1024;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

fn with_pepper<'a>(password: &'a str, pepper: Option<&str>) -> Cow<'a, str> {
    match pepper {
        Some(pepper) => Cow::Owned(format!("{pepper}{password}")),
        None => Cow::Borrowed(password),
    }
}

/// Hash `password` into a PHC string (`$argon2id$...`).
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, AuthError> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params: {e}")))?;
    let salt = SaltString::generate(&mut OsRng);

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(with_pepper(password, pepper).as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Crypto(format!("password hash: {e}")))
}

/// Check `password` against a stored PHC string.
///
/// `Ok(false)` means the password does not match; a stored hash that
/// cannot be parsed is a [`AuthError::Crypto`] error.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let stored =
        PasswordHash::new(hash).map_err(|e| AuthError::Crypto(format!("stored hash: {e}")))?;

    // Cost parameters come from the PHC string itself.
    match Argon2::default().verify_password(with_pepper(password, pepper).as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("password verify: {e}"))),
    }
}

/// Hashes and verifies passwords with the configured pepper.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    pepper: Option<String>,
}

impl PasswordHasher {
    pub fn new(pepper: Option<String>) -> Self {
        Self { pepper }
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash_password(password, self.pepper.as_deref())
    }

    /// Fails with [`AuthError::InvalidCredentials`] on mismatch.
    pub fn verify(&self, hash: &str, password: &str) -> Result<(), AuthError> {
        match verify_password(password, hash, self.pepper.as_deref())? {
            true => Ok(()),
            false => Err(AuthError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("secret123", None).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret123", &hash, None).unwrap());
        assert!(!verify_password("secret124", &hash, None).unwrap());
    }

    #[test]
    fn every_hash_gets_its_own_salt() {
        let first = hash_password("secret123", None).unwrap();
        let second = hash_password("secret123", None).unwrap();
        assert_ne!(first, second);
        assert!(verify_password("secret123", &second, None).unwrap());
    }

    #[test]
    fn pepper_must_match() {
        let hash = hash_password("secret123", Some("pepper")).unwrap();
        assert!(verify_password("secret123", &hash, Some("pepper")).unwrap());
        assert!(!verify_password("secret123", &hash, None).unwrap());
        assert!(!verify_password("secret123", &hash, Some("salt")).unwrap());
    }

    #[test]
    fn unparsable_hash_is_a_crypto_error() {
        assert!(matches!(
            verify_password("secret123", "plaintext", None),
            Err(AuthError::Crypto(_))
        ));
    }

    #[test]
    fn hasher_verify_reports_invalid_credentials() {
        let hasher = PasswordHasher::new(Some("pepper".into()));
        let hash = hasher.hash("secret123").unwrap();

        assert!(hasher.verify(&hash, "secret123").is_ok());
        assert!(matches!(
            hasher.verify(&hash, "secret124"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
