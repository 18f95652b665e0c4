//! State management for the tumor simulation.
//!
//! Contains the fixed-size subtype population vector, the per-day
//! simulation snapshot, and the append-only run trace.

mod subtype;
mod trace;

pub use subtype::{SubtypeVector, TumorSubtype, SUBTYPE_COUNT, TUMOR_SUBTYPE_COUNT};
pub use trace::{SimulationState, SimulationTrace};
