//! Salted password hashing with Argon2

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password hash is unreadable: {0}")]
    CorruptHash(String),
}

/// Hash a plaintext password into a PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Compare a plaintext password against a stored hash.
///
/// The comparison is constant-time; a mismatch is `Ok(false)`, only an
/// unparseable stored hash is an error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| PasswordError::CorruptHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// [`hash_password`] on the blocking thread pool
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))?
}

/// [`verify_password`] on the blocking thread pool
pub async fn verify_password_blocking(
    password: String,
    password_hash: String,
) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_never_equals_plaintext() {
        let hash = hash_password("secret").unwrap();
        assert_ne!(hash, "secret");
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_verify_accepts_only_the_original() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("correct horse battery stapler", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("secret", &first).unwrap());
        assert!(verify_password("secret", &second).unwrap());
    }

    #[tokio::test]
    async fn test_blocking_variants_agree() {
        let hash = hash_password_blocking("secret".to_string()).await.unwrap();
        assert!(verify_password_blocking("secret".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("Secret".to_string(), hash).await.unwrap());
    }

    #[test]
    fn test_corrupt_hash_is_an_error() {
        assert!(matches!(
            verify_password("secret", "plaintext-by-mistake"),
            Err(PasswordError::CorruptHash(_))
        ));
    }
}
