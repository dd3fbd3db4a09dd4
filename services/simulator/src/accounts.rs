//! Account registration, credential checks and password changes
//!
//! [`UserStore`] is the only writer of credentials: it validates the
//! password policy and hashes before anything reaches a [`UserRepository`].

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{SimulatorError, SimulatorResult};
use crate::models::{ExternalProfile, NewUser, User};
use crate::password::{hash_password, verify_against_dummy, verify_password};
use crate::repositories::{UserRecord, UserRepository};
use crate::validation::{normalize_email, validate_email, validate_name, validate_password};

/// Credential stored for accounts created through the external identity
/// login. Such accounts never sign in with a password.
const EXTERNAL_PLACEHOLDER_PASSWORD: &str = "SenhaPadraoGovBr1!";

/// Account operations on top of a user repository
#[derive(Clone)]
pub struct UserStore {
    repository: Arc<dyn UserRepository>,
}

impl UserStore {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Register a new account and return its ID
    pub async fn register(&self, new_user: NewUser) -> SimulatorResult<Uuid> {
        let name = new_user.name.trim().to_string();
        let email = normalize_email(&new_user.email);

        validate_name(&name)?;
        validate_email(&email)?;
        validate_password(&new_user.password)?;

        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(SimulatorError::DuplicateEmail);
        }

        let password = hash_password(&new_user.password).await?;
        let user = self
            .repository
            .insert(UserRecord {
                name,
                email,
                password,
                kind: new_user.kind,
                external_identity: false,
            })
            .await?;

        info!("Registered {} account {}", user.kind, user.id);
        Ok(user.id)
    }

    /// Check an email/password pair.
    ///
    /// Unknown emails, wrong passwords and external-identity accounts all fail
    /// with the same `InvalidCredentials`, after the same amount of hashing.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> SimulatorResult<User> {
        let email = normalize_email(email);

        let Some(user) = self.repository.find_by_email(&email).await? else {
            verify_against_dummy(password).await?;
            return Err(SimulatorError::InvalidCredentials);
        };

        let matches = verify_password(password, &user.password_hash).await?;
        if !matches || user.external_identity {
            warn!("Failed login attempt for user: {}", user.id);
            return Err(SimulatorError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Return the account behind an external identity, creating it on first
    /// login
    ///
    /// Matching is by email only: an existing password account with the
    /// provider's email is returned as is, so the external login signs into it.
    pub async fn get_or_create_simulated_external_user(
        &self,
        profile: &ExternalProfile,
    ) -> SimulatorResult<User> {
        let email = normalize_email(&profile.email);
        if let Some(user) = self.repository.find_by_email(&email).await? {
            return Ok(user);
        }

        let password = hash_password(EXTERNAL_PLACEHOLDER_PASSWORD).await?;
        let created = self
            .repository
            .insert(UserRecord {
                name: profile.name.clone(),
                email: email.clone(),
                password,
                kind: profile.kind,
                external_identity: true,
            })
            .await;

        match created {
            Ok(user) => {
                info!("Created external identity account {}", user.id);
                Ok(user)
            }
            // lost a race against a concurrent first login
            Err(SimulatorError::DuplicateEmail) => self
                .repository
                .find_by_email(&email)
                .await?
                .ok_or(SimulatorError::DuplicateEmail),
            Err(e) => Err(e),
        }
    }

    /// Replace a user's password after checking the current one
    pub async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> SimulatorResult<()> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(SimulatorError::Unauthorized)?;

        if !verify_password(current_password, &user.password_hash).await? {
            return Err(SimulatorError::InvalidCredentials);
        }

        validate_password(new_password)?;
        let password = hash_password(new_password).await?;

        if !self.repository.update_password(id, password).await? {
            return Err(SimulatorError::Unauthorized);
        }

        info!("Password changed for user: {}", id);
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> SimulatorResult<Option<User>> {
        self.repository.find_by_id(id).await
    }

    /// Delete an account; its simulations are removed with it
    pub async fn delete_account(&self, id: Uuid) -> SimulatorResult<bool> {
        self.repository.delete(id).await
    }

    pub async fn health_check(&self) -> SimulatorResult<bool> {
        self.repository.health_check().await
    }
}
