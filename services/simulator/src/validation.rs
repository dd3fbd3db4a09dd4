//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{SimulatorError, SimulatorResult};

/// Lowest accepted biochar share (%)
pub const MIN_BIOCHAR_PERCENTAGE: f64 = 0.0;
/// Highest accepted biochar share (%)
pub const MAX_BIOCHAR_PERCENTAGE: f64 = 15.0;

/// Validate a display name
pub fn validate_name(name: &str) -> SimulatorResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SimulatorError::InvalidInput("Name is required".to_string()));
    }

    if name.chars().count() > 120 {
        return Err(SimulatorError::InvalidInput(
            "Name must be at most 120 characters long".to_string(),
        ));
    }

    Ok(())
}

/// Trim and lowercase an email so uniqueness ignores case
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email
pub fn validate_email(email: &str) -> SimulatorResult<()> {
    if email.is_empty() {
        return Err(SimulatorError::InvalidEmail("Email is required".to_string()));
    }

    if email.len() > 254 {
        return Err(SimulatorError::InvalidEmail(
            "Email must be at most 254 characters long".to_string(),
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(SimulatorError::InvalidEmail("Invalid email format".to_string()));
    }

    Ok(())
}

/// Validate password complexity.
///
/// At least 8 characters with one uppercase letter, one lowercase letter and
/// one symbol (anything that is not a letter or digit, underscore included).
pub fn validate_password(password: &str) -> SimulatorResult<()> {
    if password.chars().count() < 8 {
        return Err(SimulatorError::WeakPassword(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_special = false;

    for c in password.chars() {
        if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_lowercase() {
            has_lower = true;
        } else if !c.is_ascii_alphanumeric() {
            has_special = true;
        }
    }

    if !has_upper {
        return Err(SimulatorError::WeakPassword(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    if !has_lower {
        return Err(SimulatorError::WeakPassword(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }

    if !has_special {
        return Err(SimulatorError::WeakPassword(
            "Password must contain at least one special character".to_string(),
        ));
    }

    Ok(())
}

/// Validate the biochar share fed to the retention model and to the
/// simulation store
pub fn validate_biochar_percentage(value: f64) -> SimulatorResult<f64> {
    if !value.is_finite() || !(MIN_BIOCHAR_PERCENTAGE..=MAX_BIOCHAR_PERCENTAGE).contains(&value) {
        return Err(SimulatorError::InvalidBiocharPercentage(value));
    }

    Ok(value)
}
