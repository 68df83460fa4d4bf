use std::borrow::ToOwned;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;
use tokio::task;

/// Argon2 memory cost in kibibytes (~19 MB).
const ARGON2_MEMORY_COST: u32 = 19_456;
/// Argon2 time cost (iterations).
const ARGON2_TIME_COST: u32 = 2;
/// Argon2 parallelism (lanes).
const ARGON2_PARALLELISM: u32 = 1;
/// Length of the produced password hash output (bytes).
const ARGON2_OUTPUT_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Username is already registered")]
    UsernameTaken,
    #[error("Invalid username")]
    InvalidUsername,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Password hashing join error: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Password hashing error: {0:?}")]
    PasswordHash(PasswordHashError),
    #[error("Argon2 error: {0:?}")]
    Argon2(argon2::Error),
}

/// In-memory store of registered accounts. Usernames are compared
/// case-sensitively; passwords are kept as Argon2id hashes, never plaintext.
/// The lock is released before any hashing work runs.
#[derive(Debug, Default)]
pub struct CredentialStore {
    users: RwLock<HashMap<String, String>>,
    pepper: Option<String>,
}

impl CredentialStore {
    pub fn new(pepper: Option<String>) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            pepper,
        }
    }

    /// Register a new account. Fails with [`CredentialError::UsernameTaken`]
    /// when the exact username already exists; a failed registration never
    /// mutates the store.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        if username.is_empty() {
            return Err(CredentialError::InvalidUsername);
        }
        if password.is_empty() {
            return Err(CredentialError::InvalidPassword);
        }

        if self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(username)
        {
            return Err(CredentialError::UsernameTaken);
        }

        let password_hash = hash_password(password, self.pepper.as_deref()).await?;

        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        // A concurrent register may have won the race after the early check.
        if users.contains_key(username) {
            return Err(CredentialError::UsernameTaken);
        }
        users.insert(username.to_string(), password_hash);
        Ok(())
    }

    /// Check a username/password pair. Unknown usernames and wrong passwords
    /// both come back as `Ok(false)`; only corrupt stored hashes are errors.
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        let stored_hash = self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .cloned();

        let Some(stored_hash) = stored_hash else {
            return Ok(false);
        };

        match verify_password(password, &stored_hash, self.pepper.as_deref()).await {
            Ok(()) => Ok(true),
            Err(CredentialError::InvalidPassword) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Combine the optional pepper with the provided password.
fn combine_password_and_pepper(password: &str, pepper: Option<&str>) -> String {
    match pepper {
        Some(pepper) => {
            let mut combined = String::with_capacity(pepper.len() + password.len());
            combined.push_str(pepper);
            combined.push_str(password);
            combined
        }
        None => password.to_owned(),
    }
}

/// Create an Argon2 instance with the desired security parameters.
fn configured_argon2() -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(
        ARGON2_MEMORY_COST,
        ARGON2_TIME_COST,
        ARGON2_PARALLELISM,
        Some(ARGON2_OUTPUT_LENGTH),
    )
    .map_err(CredentialError::Argon2)?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password using Argon2id with strong parameters.
async fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, CredentialError> {
    let password = password.to_owned();
    let pepper = pepper.map(ToOwned::to_owned);

    task::spawn_blocking(move || {
        let password_material = combine_password_and_pepper(&password, pepper.as_deref());
        let argon2 = configured_argon2()?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2
            .hash_password(password_material.as_bytes(), &salt)
            .map_err(CredentialError::PasswordHash)?
            .to_string();
        Ok::<_, CredentialError>(hash)
    })
    .await?
}

/// Verify a password against a stored hash.
async fn verify_password(
    password: &str,
    stored_hash: &str,
    pepper: Option<&str>,
) -> Result<(), CredentialError> {
    let password = password.to_owned();
    let stored_hash = stored_hash.to_owned();
    let pepper = pepper.map(ToOwned::to_owned);

    task::spawn_blocking(move || {
        let parsed_hash =
            PasswordHash::new(&stored_hash).map_err(CredentialError::PasswordHash)?;
        let password_material = combine_password_and_pepper(&password, pepper.as_deref());
        let verifier = configured_argon2()?;

        match verifier.verify_password(password_material.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(()),
            Err(PasswordHashError::Password) => Err(CredentialError::InvalidPassword),
            Err(err) => Err(CredentialError::PasswordHash(err)),
        }
    })
    .await?
}

/// Introduce a small random backoff when login fails to slow brute-force
/// attempts.
pub async fn randomized_backoff() {
    let base_delay = Duration::from_millis(150);
    let jitter = Duration::from_millis(fastrand::u64(0..150));
    tokio::time::sleep(base_delay + jitter).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_pair_verifies() {
        let store = CredentialStore::new(None);
        store.register("alice", "secret-password").await.unwrap();

        assert!(store.verify("alice", "secret-password").await.unwrap());
        assert!(!store.verify("alice", "wrong-password").await.unwrap());
        assert!(!store.verify("nobody", "secret-password").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_without_mutation() {
        let store = CredentialStore::new(None);
        store.register("alice", "first-password").await.unwrap();

        let err = store.register("alice", "second-password").await.unwrap_err();
        assert!(matches!(err, CredentialError::UsernameTaken));

        // The original password still verifies, the rejected one never does.
        assert!(store.verify("alice", "first-password").await.unwrap());
        assert!(!store.verify("alice", "second-password").await.unwrap());
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let store = CredentialStore::new(None);
        store.register("Alice", "secret-password").await.unwrap();

        assert!(!store.verify("alice", "secret-password").await.unwrap());
        store.register("alice", "other-password").await.unwrap();
        assert!(store.verify("alice", "other-password").await.unwrap());
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let store = CredentialStore::new(None);

        assert!(matches!(
            store.register("", "password").await.unwrap_err(),
            CredentialError::InvalidUsername
        ));
        assert!(matches!(
            store.register("alice", "").await.unwrap_err(),
            CredentialError::InvalidPassword
        ));
    }

    #[tokio::test]
    async fn pepper_participates_in_verification() {
        let peppered = CredentialStore::new(Some("pepper".to_string()));
        peppered.register("alice", "secret-password").await.unwrap();
        assert!(peppered.verify("alice", "secret-password").await.unwrap());
    }
}
