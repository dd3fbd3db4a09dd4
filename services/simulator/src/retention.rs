//! Water-retention model for biochar-amended soil
//!
//! The retained water capacity of a soil grows linearly with the biochar
//! share: `base * (1 + (pct / 100) * E)`. The model is pure; range checks on
//! the percentage belong to the caller (see [`crate::validation`]).

use crate::error::SimulatorResult;
use crate::models::{NewSimulation, SoilType};

/// Effectiveness factor of biochar on water retention
pub const BIOCHAR_EFFECTIVENESS: f64 = 1.5;

/// Retention capacity (%) of untreated soil
pub fn base_capacity(soil_type: SoilType) -> f64 {
    match soil_type {
        SoilType::Sandy => 10.0,
        SoilType::Mixed => 18.0,
        SoilType::Clayey => 25.0,
    }
}

/// Retention capacity (%) after adding `biochar_percentage` percent biochar
pub fn compute_retention(soil_type: SoilType, biochar_percentage: f64) -> f64 {
    let base = base_capacity(soil_type);
    let increase = (biochar_percentage / 100.0) * BIOCHAR_EFFECTIVENESS;
    base + base * increase
}

/// Parse the soil type and run the model.
///
/// Fails with `InvalidSoilType` for anything outside the three categories.
pub fn simulate(soil_type: &str, biochar_percentage: f64) -> SimulatorResult<NewSimulation> {
    let soil_type: SoilType = soil_type.parse()?;
    Ok(NewSimulation {
        soil_type,
        biochar_percentage,
        retention_result: compute_retention(soil_type, biochar_percentage),
    })
}
