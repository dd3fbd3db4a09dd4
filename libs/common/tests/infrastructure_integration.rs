//! Integration tests for the PostgreSQL infrastructure
//!
//! These tests need a reachable PostgreSQL instance pointed to by
//! `DATABASE_URL`; run them with `cargo test -- --ignored`.

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use sqlx::Row;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_migrations_create_schema() -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;
    // Migrations are idempotent
    run_migrations(&pool).await?;

    let row = sqlx::query(
        "SELECT COUNT(*) AS tables FROM information_schema.tables \
         WHERE table_name IN ('users', 'simulations')",
    )
    .fetch_one(&pool)
    .await?;
    let tables: i64 = row.get("tables");
    assert_eq!(tables, 2);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_deleting_user_cascades_to_simulations() -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;
    run_migrations(&pool).await?;

    let user_id = Uuid::new_v4();
    let email = format!("cascade-{}@example.com", user_id);
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, kind) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind("Cascade")
    .bind(&email)
    .bind("$argon2id$placeholder")
    .bind("citizen")
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO simulations (soil_type, biochar_percentage, retention_result, user_id) \
         VALUES ('sandy', 10.0, 11.5, $1), ('mixed', 5.0, 19.35, $1)",
    )
    .bind(user_id)
    .execute(&pool)
    .await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await?;

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM simulations WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(remaining, 0, "simulations should be removed with their owner");

    Ok(())
}
