//! PostgreSQL user repository

use async_trait::async_trait;
use chrono::Utc;
use common::error::DatabaseError;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{UserRecord, UserRepository};
use crate::error::{SimulatorError, SimulatorResult};
use crate::models::User;
use crate::password::HashedPassword;

/// User repository backed by the `users` table
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> SimulatorResult<User> {
    let kind: String = row.get("kind");
    Ok(User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        kind: kind.parse()?,
        external_identity: row.get("external_identity"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, record: UserRecord) -> SimulatorResult<User> {
        info!("Creating new user: {}", record.email);

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, kind, external_identity, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, email, password_hash, kind, external_identity, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.name)
        .bind(&record.email)
        .bind(record.password.as_str())
        .bind(record.kind.as_str())
        .bind(record.external_identity)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = DatabaseError::Query(e);
            if err.is_unique_violation() {
                SimulatorError::DuplicateEmail
            } else {
                SimulatorError::Database(err)
            }
        })?;

        user_from_row(&row)
    }

    async fn find_by_email(&self, email: &str) -> SimulatorResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, kind, external_identity, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> SimulatorResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, kind, external_identity, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_password(&self, id: Uuid, password: HashedPassword) -> SimulatorResult<bool> {
        info!("Updating password for user: {}", id);

        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password.as_str())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> SimulatorResult<bool> {
        info!("Deleting user: {}", id);

        // simulations go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> SimulatorResult<bool> {
        Ok(common::database::health_check(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountKind;
    use crate::password::hash_password;
    use crate::repositories::test_pool;

    async fn record(email: &str) -> UserRecord {
        UserRecord {
            name: "Pg User".to_string(),
            email: email.to_string(),
            password: hash_password("Biochar#2024").await.unwrap(),
            kind: AccountKind::Researcher,
            external_identity: false,
        }
    }

    fn unique_email() -> String {
        format!("pg-{}@example.com", Uuid::new_v4())
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn insert_then_find_by_email_and_id() {
        let repo = PgUserRepository::new(test_pool().await);
        let email = unique_email();

        let user = repo.insert(record(&email).await).await.unwrap();
        assert_eq!(user.email, email);
        assert_eq!(user.kind, AccountKind::Researcher);

        let by_email = repo.find_by_email(&email).await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        let by_id = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, email);
        assert!(by_id.password_hash.starts_with("$argon2"));

        assert!(repo.delete(user.id).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn duplicate_insert_is_duplicate_email() {
        let repo = PgUserRepository::new(test_pool().await);
        let email = unique_email();

        let user = repo.insert(record(&email).await).await.unwrap();
        let err = repo.insert(record(&email).await).await.unwrap_err();
        assert!(matches!(err, SimulatorError::DuplicateEmail));

        repo.delete(user.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn update_and_delete_report_missing_users() {
        let repo = PgUserRepository::new(test_pool().await);
        let user = repo.insert(record(&unique_email()).await).await.unwrap();

        let replacement = hash_password("Newer#Pass1").await.unwrap();
        assert!(repo.update_password(user.id, replacement.clone()).await.unwrap());
        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, replacement.as_str());

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(!repo.update_password(user.id, replacement).await.unwrap());
        assert!(repo.find_by_id(user.id).await.unwrap().is_none());
    }
}
