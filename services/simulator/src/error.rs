//! Error taxonomy for the simulator service

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every failure the simulator core can report
///
/// All variants are recoverable at the request boundary.
#[derive(Error, Debug)]
pub enum SimulatorError {
    /// Soil type outside the supported categories
    #[error("Invalid soil type: {0}")]
    InvalidSoilType(String),

    /// Biochar percentage outside 0..=15 or not a finite number
    #[error("Biochar percentage must be between 0 and 15, got {0}")]
    InvalidBiocharPercentage(f64),

    /// Simulation owner is absent or does not exist
    #[error("Owner not found")]
    OwnerNotFound,

    /// Email already registered
    #[error("Email already registered")]
    DuplicateEmail,

    /// Password does not satisfy the complexity policy
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Email does not look like an email address
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Missing or malformed request field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown email or wrong password, indistinguishable to the caller
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, invalid or expired session
    #[error("Unauthorized")]
    Unauthorized,

    /// Record does not exist or belongs to another user
    #[error("Simulation not found or not owned by the current user")]
    NotFoundOrNotOwned,

    /// Hashing, token signing or other internal failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl SimulatorError {
    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            SimulatorError::InvalidSoilType(_) => "InvalidSoilType",
            SimulatorError::InvalidBiocharPercentage(_) => "InvalidBiocharPercentage",
            SimulatorError::OwnerNotFound => "OwnerNotFound",
            SimulatorError::DuplicateEmail => "DuplicateEmail",
            SimulatorError::WeakPassword(_) => "WeakPassword",
            SimulatorError::InvalidEmail(_) => "InvalidEmail",
            SimulatorError::InvalidInput(_) => "InvalidInput",
            SimulatorError::InvalidCredentials => "InvalidCredentials",
            SimulatorError::Unauthorized => "Unauthorized",
            SimulatorError::NotFoundOrNotOwned => "NotFoundOrNotOwned",
            SimulatorError::Internal(_) => "Internal",
            SimulatorError::Database(_) => "Database",
        }
    }

    /// HTTP status used when the error reaches a handler boundary
    pub fn status(&self) -> StatusCode {
        match self {
            SimulatorError::InvalidSoilType(_)
            | SimulatorError::InvalidBiocharPercentage(_)
            | SimulatorError::WeakPassword(_)
            | SimulatorError::InvalidEmail(_)
            | SimulatorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SimulatorError::InvalidCredentials | SimulatorError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            SimulatorError::OwnerNotFound | SimulatorError::NotFoundOrNotOwned => {
                StatusCode::NOT_FOUND
            }
            SimulatorError::DuplicateEmail => StatusCode::CONFLICT,
            SimulatorError::Internal(_) | SimulatorError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SimulatorError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": self.kind(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for SimulatorError {
    fn from(rejection: JsonRejection) -> Self {
        SimulatorError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for SimulatorError {
    fn from(rejection: PathRejection) -> Self {
        SimulatorError::InvalidInput(rejection.body_text())
    }
}

/// Type alias for simulator results
pub type SimulatorResult<T> = Result<T, SimulatorError>;
