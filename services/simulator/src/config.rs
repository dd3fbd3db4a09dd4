//! Service configuration
//!
//! Values come from `SIMULATOR_*` environment variables layered over
//! defaults. The database itself is configured through
//! [`common::database::DatabaseConfig`].

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

use crate::session::SessionConfig;

/// Where users and simulations are kept
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Simulator service configuration
///
/// # Environment Variables
/// - `SIMULATOR_HOST` (default: `0.0.0.0`)
/// - `SIMULATOR_PORT` (default: `3000`)
/// - `SIMULATOR_STORAGE`: `postgres` or `memory` (default: `postgres`)
/// - `SIMULATOR_SESSION_SECRET`: token signing secret (required)
/// - `SIMULATOR_SESSION_TTL_SECONDS` (default: 1 day)
/// - `SIMULATOR_REMEMBER_ME_TTL_SECONDS` (default: 7 days)
/// - `SIMULATOR_EXTERNAL_IDENTITY_EMAIL` (default: `govbr@exemplo.com`)
/// - `SIMULATOR_EXTERNAL_IDENTITY_NAME` (default: `Usuário Gov.br`)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub session_secret: String,
    pub session_ttl_seconds: u64,
    pub remember_me_ttl_seconds: u64,
    pub external_identity_email: String,
    pub external_identity_name: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000_i64)?
            .set_default("storage", "postgres")?
            .set_default("session_ttl_seconds", 86_400_i64)?
            .set_default("remember_me_ttl_seconds", 604_800_i64)?
            .set_default("external_identity_email", "govbr@exemplo.com")?
            .set_default("external_identity_name", "Usuário Gov.br")?
            .add_source(Environment::with_prefix("SIMULATOR").try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        if config.session_secret.trim().is_empty() {
            anyhow::bail!("SIMULATOR_SESSION_SECRET must not be empty");
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            secret: self.session_secret.clone(),
            ttl_seconds: self.session_ttl_seconds,
            remember_me_ttl_seconds: self.remember_me_ttl_seconds,
        }
    }
}
