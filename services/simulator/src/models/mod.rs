//! Simulator domain models

pub mod simulation;
pub mod user;

// Re-export for convenience
pub use simulation::{NewSimulation, SimulationRecord, SoilType};
pub use user::{AccountKind, ExternalProfile, NewUser, User};
