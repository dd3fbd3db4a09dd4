//! Storage ports and their PostgreSQL / in-memory adapters

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::SimulatorResult;
use crate::models::{AccountKind, NewSimulation, SimulationRecord, User};
use crate::password::HashedPassword;

pub mod memory;
pub mod simulation;
pub mod user;

pub use memory::MemoryStore;
pub use simulation::PgSimulationStore;
pub use user::PgUserRepository;

/// Account row ready to be inserted; the credential is already hashed
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub password: HashedPassword,
    pub kind: AccountKind,
    pub external_identity: bool,
}

/// Persistence of user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert an account; fails with `DuplicateEmail` when the email is taken
    async fn insert(&self, record: UserRecord) -> SimulatorResult<User>;

    /// Find a user by normalized email
    async fn find_by_email(&self, email: &str) -> SimulatorResult<Option<User>>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> SimulatorResult<Option<User>>;

    /// Replace the stored credential; returns whether the user existed
    async fn update_password(&self, id: Uuid, password: HashedPassword) -> SimulatorResult<bool>;

    /// Delete a user together with all of their simulations
    async fn delete(&self, id: Uuid) -> SimulatorResult<bool>;

    /// Whether the backing storage is reachable
    async fn health_check(&self) -> SimulatorResult<bool>;
}

/// Persistence of simulation records, always scoped to their owner
#[async_trait]
pub trait SimulationStore: Send + Sync {
    /// Persist a computed simulation for `owner`.
    ///
    /// Fails with `OwnerNotFound` when `owner` is absent or unknown. The
    /// biochar range is not re-validated here.
    async fn create(
        &self,
        owner: Option<Uuid>,
        simulation: NewSimulation,
    ) -> SimulatorResult<SimulationRecord>;

    /// All records of `owner`, newest first, ties broken by ID descending
    async fn list_by_owner(&self, owner: Uuid) -> SimulatorResult<Vec<SimulationRecord>>;

    /// Delete a record only if it belongs to `owner`; returns whether a row
    /// was removed
    async fn delete_by_id_and_owner(&self, id: i64, owner: Uuid) -> SimulatorResult<bool>;
}

/// Migrated pool for the PostgreSQL adapter tests (needs `DATABASE_URL`)
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::PgPool {
    use common::database::{DatabaseConfig, init_pool, run_migrations};

    let config = DatabaseConfig::from_env().unwrap();
    let pool = init_pool(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}
