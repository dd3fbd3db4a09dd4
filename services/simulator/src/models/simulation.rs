//! Simulation record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SimulatorError;

/// Soil categories supported by the retention model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Sandy,
    Clayey,
    Mixed,
}

impl SoilType {
    pub const ALL: [SoilType; 3] = [SoilType::Sandy, SoilType::Mixed, SoilType::Clayey];

    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Sandy => "sandy",
            SoilType::Clayey => "clayey",
            SoilType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilType {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandy" => Ok(SoilType::Sandy),
            "clayey" => Ok(SoilType::Clayey),
            "mixed" => Ok(SoilType::Mixed),
            _ => Err(SimulatorError::InvalidSoilType(s.to_string())),
        }
    }
}

/// Persisted simulation result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRecord {
    pub id: i64,
    pub soil_type: SoilType,
    pub biochar_percentage: f64,
    pub retention_result: f64,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Inputs and computed result of a simulation, before it is saved
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NewSimulation {
    pub soil_type: SoilType,
    pub biochar_percentage: f64,
    pub retention_result: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soil_type_round_trips_through_storage_name() {
        for soil in SoilType::ALL {
            assert_eq!(soil.as_str().parse::<SoilType>().unwrap(), soil);
        }
    }

    #[test]
    fn soil_type_parsing_ignores_case_and_whitespace() {
        assert_eq!("  Clayey ".parse::<SoilType>().unwrap(), SoilType::Clayey);
        assert_eq!("MIXED".parse::<SoilType>().unwrap(), SoilType::Mixed);
    }

    #[test]
    fn unknown_soil_type_is_rejected() {
        let err = "loamy".parse::<SoilType>().unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidSoilType(ref s) if s == "loamy"));
    }
}
