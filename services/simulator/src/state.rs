//! Application state shared across handlers

use anyhow::Result;
use common::database::{self, DatabaseConfig};
use std::sync::Arc;
use tracing::info;

use crate::accounts::UserStore;
use crate::config::{AppConfig, StorageBackend};
use crate::identity::{ExternalIdentityProvider, SimulatedGovIdentity};
use crate::repositories::{
    MemoryStore, PgSimulationStore, PgUserRepository, SimulationStore, UserRepository,
};
use crate::session::SessionService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub simulations: Arc<dyn SimulationStore>,
    pub sessions: SessionService,
    pub identity: Arc<dyn ExternalIdentityProvider>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        simulations: Arc<dyn SimulationStore>,
        sessions: SessionService,
        identity: Arc<dyn ExternalIdentityProvider>,
    ) -> Self {
        Self {
            users: UserStore::new(user_repository),
            simulations,
            sessions,
            identity,
        }
    }

    /// Wire stores, sessions and the identity provider from configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let sessions = SessionService::new(config.session_config())?;
        let identity: Arc<dyn ExternalIdentityProvider> = Arc::new(SimulatedGovIdentity::new(
            config.external_identity_email.clone(),
            config.external_identity_name.clone(),
        ));

        let state = match config.storage {
            StorageBackend::Postgres => {
                let db_config = DatabaseConfig::from_env()?;
                let pool = database::init_pool(&db_config).await?;

                if database::health_check(&pool).await? {
                    info!("Database connection successful");
                } else {
                    anyhow::bail!("Failed to connect to database");
                }
                database::run_migrations(&pool).await?;

                Self::new(
                    Arc::new(PgUserRepository::new(pool.clone())),
                    Arc::new(PgSimulationStore::new(pool)),
                    sessions,
                    identity,
                )
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage; data is lost on restart");
                let store = MemoryStore::new();
                Self::new(
                    Arc::new(store.clone()),
                    Arc::new(store),
                    sessions,
                    identity,
                )
            }
        };

        Ok(state)
    }
}
