//! In-process storage backend
//!
//! Holds users and simulations behind one lock, so deleting a user and its
//! simulations happens in a single critical section.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{SimulationStore, UserRecord, UserRepository};
use crate::error::{SimulatorError, SimulatorResult};
use crate::models::{NewSimulation, SimulationRecord, User};
use crate::password::HashedPassword;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    simulations: BTreeMap<i64, SimulationRecord>,
    next_simulation_id: i64,
}

/// Users and simulations kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, record: UserRecord) -> SimulatorResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == record.email) {
            return Err(SimulatorError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: record.name,
            email: record.email,
            password_hash: record.password.into_string(),
            kind: record.kind,
            external_identity: record.external_identity,
            created_at: Utc::now(),
        };
        info!("Creating new user: {}", user.email);
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> SimulatorResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> SimulatorResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn update_password(&self, id: Uuid, password: HashedPassword) -> SimulatorResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password.into_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> SimulatorResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }

        tables.simulations.retain(|_, sim| sim.user_id != id);
        info!("Deleted user {} and their simulations", id);
        Ok(true)
    }

    async fn health_check(&self) -> SimulatorResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl SimulationStore for MemoryStore {
    async fn create(
        &self,
        owner: Option<Uuid>,
        simulation: NewSimulation,
    ) -> SimulatorResult<SimulationRecord> {
        let owner = owner.ok_or(SimulatorError::OwnerNotFound)?;
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&owner) {
            return Err(SimulatorError::OwnerNotFound);
        }

        tables.next_simulation_id += 1;
        let record = SimulationRecord {
            id: tables.next_simulation_id,
            soil_type: simulation.soil_type,
            biochar_percentage: simulation.biochar_percentage,
            retention_result: simulation.retention_result,
            user_id: owner,
            created_at: Utc::now(),
        };
        tables.simulations.insert(record.id, record.clone());

        Ok(record)
    }

    async fn list_by_owner(&self, owner: Uuid) -> SimulatorResult<Vec<SimulationRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<SimulationRecord> = tables
            .simulations
            .values()
            .filter(|sim| sim.user_id == owner)
            .cloned()
            .collect();

        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    async fn delete_by_id_and_owner(&self, id: i64, owner: Uuid) -> SimulatorResult<bool> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .simulations
            .get(&id)
            .is_some_and(|sim| sim.user_id == owner);
        if owned {
            tables.simulations.remove(&id);
        }
        Ok(owned)
    }
}
