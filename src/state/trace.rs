//! Per-day simulation snapshots and the append-only trace.

use serde::{Deserialize, Serialize};

use super::subtype::{SubtypeVector, TUMOR_SUBTYPE_COUNT};

/// Complete recorded state for a single simulation day.
///
/// Everything here describes the system AT the given day: the populations,
/// the drug concentration in effect that day, and the fitness each tumor
/// subtype experienced under that composition and concentration. The
/// stochastic perturbation is part of the day-to-day transition and is not
/// recorded, which keeps every stored quantity recomputable from the
/// populations alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Day index, 0-based (day 0 is the supplied initial condition)
    pub day: u32,
    /// Population counts for all four subtypes
    pub populations: SubtypeVector,
    /// Drug concentration for this day, in [0, dose_intensity]
    pub drug_concentration: f64,
    /// Replicator fitness per tumor subtype [sensitive, resistant, stem]
    pub fitness: [f64; TUMOR_SUBTYPE_COUNT],
}

/// Ordered day-by-day history of one simulation run.
///
/// Length is exactly `time_steps + 1` for a completed run (day 0 through
/// day `time_steps`). States are appended by the engine and never modified
/// afterwards; consumers read only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationTrace {
    states: Vec<SimulationState>,
}

impl SimulationTrace {
    /// Create an empty trace with capacity for a full run
    pub fn with_capacity(time_steps: u32) -> Self {
        Self {
            states: Vec::with_capacity(time_steps as usize + 1),
        }
    }

    /// Append the next day's state. Engine-internal.
    pub(crate) fn push(&mut self, state: SimulationState) {
        debug_assert_eq!(state.day as usize, self.states.len());
        self.states.push(state);
    }

    /// Number of recorded days (time_steps + 1 for a completed run)
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when no day has been recorded
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// State at a given day index
    pub fn get(&self, day: usize) -> Option<&SimulationState> {
        self.states.get(day)
    }

    /// The day-0 initial condition
    pub fn initial(&self) -> Option<&SimulationState> {
        self.states.first()
    }

    /// The last recorded state
    pub fn last(&self) -> Option<&SimulationState> {
        self.states.last()
    }

    /// Iterate over recorded states in day order
    pub fn iter(&self) -> std::slice::Iter<'_, SimulationState> {
        self.states.iter()
    }

    /// Tumor burden at day 0, or 0.0 for an empty trace
    pub fn initial_tumor_burden(&self) -> f64 {
        self.initial()
            .map(|s| s.populations.tumor_burden())
            .unwrap_or(0.0)
    }

    /// Tumor burden at the final recorded day, or 0.0 for an empty trace
    pub fn final_tumor_burden(&self) -> f64 {
        self.last()
            .map(|s| s.populations.tumor_burden())
            .unwrap_or(0.0)
    }
}

impl<'a> IntoIterator for &'a SimulationTrace {
    type Item = &'a SimulationState;
    type IntoIter = std::slice::Iter<'a, SimulationState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}
