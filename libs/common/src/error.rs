//! Custom error types for the common library
//!
//! This module defines the storage-level error type shared by every
//! PostgreSQL-backed component of the simulator.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Whether the underlying failure is a unique constraint violation
    pub fn is_unique_violation(&self) -> bool {
        self.database_error()
            .is_some_and(|db| db.is_unique_violation())
    }

    /// Whether the underlying failure is a foreign key violation
    pub fn is_foreign_key_violation(&self) -> bool {
        self.database_error()
            .is_some_and(|db| db.is_foreign_key_violation())
    }

    fn database_error(&self) -> Option<&dyn sqlx::error::DatabaseError> {
        match self {
            DatabaseError::Connection(e) | DatabaseError::Query(e) => e.as_database_error(),
            _ => None,
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_sqlx_errors_are_not_constraint_violations() {
        let err = DatabaseError::Migration("boom".to_string());
        assert!(!err.is_unique_violation());
        assert!(!err.is_foreign_key_violation());
        assert_eq!(err.to_string(), "Database migration error: boom");
    }

    #[test]
    fn row_not_found_is_not_a_constraint_violation() {
        let err = DatabaseError::Query(SqlxError::RowNotFound);
        assert!(!err.is_unique_violation());
        assert!(!err.is_foreign_key_violation());
    }
}
