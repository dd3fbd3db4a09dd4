//! PostgreSQL simulation store

use async_trait::async_trait;
use chrono::Utc;
use common::error::DatabaseError;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::SimulationStore;
use crate::error::{SimulatorError, SimulatorResult};
use crate::models::{NewSimulation, SimulationRecord};

/// Simulation store backed by the `simulations` table
#[derive(Clone)]
pub struct PgSimulationStore {
    pool: PgPool,
}

impl PgSimulationStore {
    /// Create a new simulation store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &PgRow) -> SimulatorResult<SimulationRecord> {
    let soil_type: String = row.get("soil_type");
    Ok(SimulationRecord {
        id: row.get("id"),
        soil_type: soil_type.parse()?,
        biochar_percentage: row.get("biochar_percentage"),
        retention_result: row.get("retention_result"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl SimulationStore for PgSimulationStore {
    async fn create(
        &self,
        owner: Option<Uuid>,
        simulation: NewSimulation,
    ) -> SimulatorResult<SimulationRecord> {
        let owner = owner.ok_or(SimulatorError::OwnerNotFound)?;
        info!(
            "Saving {} simulation ({}% biochar) for user: {}",
            simulation.soil_type, simulation.biochar_percentage, owner
        );

        let row = sqlx::query(
            r#"
            INSERT INTO simulations (soil_type, biochar_percentage, retention_result, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, soil_type, biochar_percentage, retention_result, user_id, created_at
            "#,
        )
        .bind(simulation.soil_type.as_str())
        .bind(simulation.biochar_percentage)
        .bind(simulation.retention_result)
        .bind(owner)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = DatabaseError::Query(e);
            if err.is_foreign_key_violation() {
                SimulatorError::OwnerNotFound
            } else {
                SimulatorError::Database(err)
            }
        })?;

        record_from_row(&row)
    }

    async fn list_by_owner(&self, owner: Uuid) -> SimulatorResult<Vec<SimulationRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, soil_type, biochar_percentage, retention_result, user_id, created_at
            FROM simulations
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        rows.iter().map(record_from_row).collect()
    }

    async fn delete_by_id_and_owner(&self, id: i64, owner: Uuid) -> SimulatorResult<bool> {
        let result = sqlx::query("DELETE FROM simulations WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        let deleted = result.rows_affected() > 0;
        info!("Delete simulation {} for user {}: deleted={}", id, owner, deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountKind, SoilType};
    use crate::password::hash_password;
    use crate::repositories::{PgUserRepository, UserRecord, UserRepository, test_pool};
    use crate::retention::simulate;

    async fn owner(pool: &PgPool) -> Uuid {
        PgUserRepository::new(pool.clone())
            .insert(UserRecord {
                name: "Pg Owner".to_string(),
                email: format!("owner-{}@example.com", Uuid::new_v4()),
                password: hash_password("Biochar#2024").await.unwrap(),
                kind: AccountKind::Citizen,
                external_identity: false,
            })
            .await
            .unwrap()
            .id
    }

    async fn remove_owner(pool: &PgPool, id: Uuid) {
        PgUserRepository::new(pool.clone()).delete(id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn create_for_missing_owner_is_owner_not_found() {
        let store = PgSimulationStore::new(test_pool().await);
        let sim = simulate("sandy", 5.0).unwrap();

        let err = store.create(None, sim).await.unwrap_err();
        assert!(matches!(err, SimulatorError::OwnerNotFound));

        let err = store.create(Some(Uuid::new_v4()), sim).await.unwrap_err();
        assert!(matches!(err, SimulatorError::OwnerNotFound));
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn list_is_newest_first_and_scoped_to_owner() {
        let pool = test_pool().await;
        let store = PgSimulationStore::new(pool.clone());
        let alice = owner(&pool).await;
        let bob = owner(&pool).await;

        let first = store
            .create(Some(alice), simulate("sandy", 5.0).unwrap())
            .await
            .unwrap();
        let second = store
            .create(Some(alice), simulate("clayey", 15.0).unwrap())
            .await
            .unwrap();
        store
            .create(Some(bob), simulate("mixed", 10.0).unwrap())
            .await
            .unwrap();

        let list = store.list_by_owner(alice).await.unwrap();
        let ids: Vec<i64> = list.iter().map(|sim| sim.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(list[0].soil_type, SoilType::Clayey);
        assert!((list[0].retention_result - 30.625).abs() < 1e-9);
        assert!(list.iter().all(|sim| sim.user_id == alice));

        remove_owner(&pool, alice).await;
        remove_owner(&pool, bob).await;
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn equal_timestamps_list_by_id_descending() {
        let pool = test_pool().await;
        let store = PgSimulationStore::new(pool.clone());
        let owner = owner(&pool).await;
        let created_at = Utc::now();

        for _ in 0..3 {
            sqlx::query(
                "INSERT INTO simulations (soil_type, biochar_percentage, retention_result, user_id, created_at) \
                 VALUES ('sandy', 5.0, 10.75, $1, $2)",
            )
            .bind(owner)
            .bind(created_at)
            .execute(&pool)
            .await
            .unwrap();
        }

        let ids: Vec<i64> = store
            .list_by_owner(owner)
            .await
            .unwrap()
            .iter()
            .map(|sim| sim.id)
            .collect();
        let mut expected = ids.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(ids.len(), 3);
        assert_eq!(ids, expected);

        remove_owner(&pool, owner).await;
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn delete_by_non_owner_leaves_record() {
        let pool = test_pool().await;
        let store = PgSimulationStore::new(pool.clone());
        let alice = owner(&pool).await;
        let bob = owner(&pool).await;

        let record = store
            .create(Some(alice), simulate("mixed", 3.0).unwrap())
            .await
            .unwrap();

        assert!(!store.delete_by_id_and_owner(record.id, bob).await.unwrap());
        assert_eq!(store.list_by_owner(alice).await.unwrap().len(), 1);

        assert!(store.delete_by_id_and_owner(record.id, alice).await.unwrap());
        assert!(!store.delete_by_id_and_owner(record.id, alice).await.unwrap());
        assert!(store.list_by_owner(alice).await.unwrap().is_empty());

        remove_owner(&pool, alice).await;
        remove_owner(&pool, bob).await;
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn deleting_owner_cascades() {
        let pool = test_pool().await;
        let store = PgSimulationStore::new(pool.clone());
        let owner = owner(&pool).await;

        store
            .create(Some(owner), simulate("sandy", 1.0).unwrap())
            .await
            .unwrap();
        remove_owner(&pool, owner).await;

        assert!(store.list_by_owner(owner).await.unwrap().is_empty());
    }
}
