//! Credential hashing.
//!
//! Argon2id with fixed cost parameters and a random salt per hash. The PHC
//! string output embeds algorithm, parameters and salt, so verification only
//! needs the stored string.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;

use crate::{EngineError, ResultEngine};

/// Memory cost in KiB.
const MEMORY_COST: u32 = 19 * 1024;
/// Number of passes over memory.
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

fn hasher() -> ResultEngine<Argon2<'static>> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, None)
        .map_err(|err| EngineError::Hashing(err.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext password.
pub fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Hashing(err.to_string()))
}

/// Check a plaintext password against a stored hash.
///
/// A stored value that is not a valid PHC string is an error, not a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> ResultEngine<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|err| EngineError::Hashing(err.to_string()))?;
    Ok(hasher()?
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// [`hash_password`] on the blocking pool.
pub(crate) async fn hash_password_blocking(password: String) -> ResultEngine<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|err| EngineError::Hashing(err.to_string()))?
}

/// [`verify_password`] on the blocking pool.
pub(crate) async fn verify_password_blocking(
    password: String,
    stored_hash: String,
) -> ResultEngine<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|err| EngineError::Hashing(err.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("pw123456").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("pw123456"));
        assert!(verify_password("pw123456", &hash).unwrap());
        assert!(!verify_password("pw1234567", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same", &second).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("pw", "not-a-hash"),
            Err(EngineError::Hashing(_))
        ));
    }

    #[tokio::test]
    async fn blocking_variants_agree() {
        let hash = hash_password_blocking("pw123456".to_string())
            .await
            .unwrap();
        assert!(
            verify_password_blocking("pw123456".to_string(), hash)
                .await
                .unwrap()
        );
    }
}
