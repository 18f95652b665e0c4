//! Configuration module: the simulation parameter bundle (wire-contract
//! field names) and patient modifiers.

mod parameters;

pub use parameters::{PatientProfile, SimulationParameters};
