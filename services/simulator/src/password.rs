//! Password hashing
//!
//! Every credential that reaches storage passes through [`hash_password`]:
//! the repositories only accept a [`HashedPassword`], and this module is the
//! only place that can build one. Argon2 is slow, so both
//! hashing and verification run on the blocking thread pool.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use std::fmt;
use std::sync::OnceLock;
use tokio::task;

use crate::error::{SimulatorError, SimulatorResult};

/// Argon2 PHC string produced by [`hash_password`]
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(<redacted>)")
    }
}

/// Hash a plaintext password with a fresh random salt
pub async fn hash_password(password: &str) -> SimulatorResult<HashedPassword> {
    let password = password.to_owned();
    task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|e| SimulatorError::Internal(format!("Hashing task failed: {}", e)))?
}

/// Compare a plaintext password with a stored hash
pub async fn verify_password(password: &str, password_hash: &str) -> SimulatorResult<bool> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    task::spawn_blocking(move || verify_blocking(&password, &password_hash))
        .await
        .map_err(|e| SimulatorError::Internal(format!("Verification task failed: {}", e)))?
}

/// Burn the same verification cost as a real check; used when the email is
/// unknown so both failure paths take comparable time
pub async fn verify_against_dummy(password: &str) -> SimulatorResult<()> {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();

    let dummy = match DUMMY_HASH.get() {
        Some(hash) => hash.clone(),
        None => {
            let hash = hash_password("dummy-Password!").await?.into_string();
            DUMMY_HASH.get_or_init(|| hash).clone()
        }
    };

    verify_password(password, &dummy).await.map(|_| ())
}

fn hash_blocking(password: &str) -> SimulatorResult<HashedPassword> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| HashedPassword(hash.to_string()))
        .map_err(|e| SimulatorError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_blocking(password: &str, password_hash: &str) -> SimulatorResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| SimulatorError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
