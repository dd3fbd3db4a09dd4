//! External identity providers
//!
//! A provider turns an external login into an [`ExternalProfile`]. The only
//! implementation today is [`SimulatedGovIdentity`], which stands in for the
//! government digital-identity login and always succeeds with a fixed
//! profile. A real OAuth2/OIDC provider plugs in behind the same trait.

use async_trait::async_trait;
use tracing::info;

use crate::error::SimulatorResult;
use crate::models::{AccountKind, ExternalProfile};

/// Source of externally authenticated identities
#[async_trait]
pub trait ExternalIdentityProvider: Send + Sync {
    /// Provider name, for logs and responses
    fn name(&self) -> &'static str;

    /// Complete the external login and return the authenticated profile
    async fn authenticate(&self) -> SimulatorResult<ExternalProfile>;
}

/// Stubbed government login that always authenticates the same citizen
#[derive(Debug, Clone)]
pub struct SimulatedGovIdentity {
    email: String,
    name: String,
}

impl SimulatedGovIdentity {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

#[async_trait]
impl ExternalIdentityProvider for SimulatedGovIdentity {
    fn name(&self) -> &'static str {
        "gov.br (simulated)"
    }

    async fn authenticate(&self) -> SimulatorResult<ExternalProfile> {
        info!("Simulated external login for {}", self.email);
        Ok(ExternalProfile {
            email: self.email.clone(),
            name: self.name.clone(),
            kind: AccountKind::Citizen,
        })
    }
}
