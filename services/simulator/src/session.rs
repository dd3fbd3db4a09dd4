//! Session tokens
//!
//! Sessions are stateless HS256 JWTs carrying the user ID. A "remember me"
//! login gets the longer TTL; otherwise the token lives for the regular
//! session TTL.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{SimulatorError, SimulatorResult};
use crate::models::User;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC secret used to sign tokens
    pub secret: String,
    /// Lifetime of a regular session in seconds
    pub ttl_seconds: u64,
    /// Lifetime of a "remember me" session in seconds
    pub remember_me_ttl_seconds: u64,
}

/// Session claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Whether the session came from the external identity login
    pub external: bool,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Signed session token and its lifetime
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_in: u64,
}

/// Issues and validates session tokens
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: SessionConfig,
}

impl SessionService {
    pub fn new(config: SessionConfig) -> SimulatorResult<Self> {
        if config.secret.is_empty() {
            return Err(SimulatorError::InvalidInput(
                "Session secret must not be empty".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        })
    }

    /// Sign a session for `user`
    pub fn issue(&self, user: &User, remember_me: bool) -> SimulatorResult<IssuedSession> {
        let expires_in = if remember_me {
            self.config.remember_me_ttl_seconds
        } else {
            self.config.ttl_seconds
        };

        let now = now_seconds()?;
        let claims = Claims {
            sub: user.id,
            external: user.external_identity,
            iat: now,
            exp: now + expires_in,
        };

        let token = self.encode_claims(&claims)?;
        debug!("Session issued for user: {}", user.id);
        Ok(IssuedSession { token, expires_in })
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> SimulatorResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("Rejected session token: {}", e);
                SimulatorError::Unauthorized
            })
    }

    fn encode_claims(&self, claims: &Claims) -> SimulatorResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| SimulatorError::Internal(format!("Failed to sign session: {}", e)))
    }
}

fn now_seconds() -> SimulatorResult<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| SimulatorError::Internal(format!("Failed to get current time: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountKind;
    use chrono::Utc;

    fn service(secret: &str) -> SessionService {
        SessionService::new(SessionConfig {
            secret: secret.to_string(),
            ttl_seconds: 3600,
            remember_me_ttl_seconds: 7 * 24 * 3600,
        })
        .unwrap()
    }

    fn user(external_identity: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: String::new(),
            kind: AccountKind::Citizen,
            external_identity,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issue_and_validate_roundtrip() {
        let sessions = service("test-secret");
        let user = user(false);

        let issued = sessions.issue(&user, false).unwrap();
        assert_eq!(issued.expires_in, 3600);

        let claims = sessions.validate(&issued.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert!(!claims.external);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn remember_me_extends_lifetime() {
        let sessions = service("test-secret");
        let issued = sessions.issue(&user(true), true).unwrap();
        assert_eq!(issued.expires_in, 7 * 24 * 3600);

        let claims = sessions.validate(&issued.token).unwrap();
        assert!(claims.external);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issued = service("secret-a").issue(&user(false), false).unwrap();
        let err = service("secret-b").validate(&issued.token).unwrap_err();
        assert!(matches!(err, SimulatorError::Unauthorized));
    }

    #[test]
    fn expired_token_is_rejected() {
        let sessions = service("test-secret");
        let now = now_seconds().unwrap();
        let token = sessions
            .encode_claims(&Claims {
                sub: Uuid::new_v4(),
                external: false,
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(
            sessions.validate(&token),
            Err(SimulatorError::Unauthorized)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(service("test-secret").validate("not.a.jwt").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let result = SessionService::new(SessionConfig {
            secret: String::new(),
            ttl_seconds: 1,
            remember_me_ttl_seconds: 1,
        });
        assert!(result.is_err());
    }
}
