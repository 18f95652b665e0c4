//! OncoSim - tumor-immune-drug evolution simulation engine
//!
//! Simulates day-by-day evolution of a heterogeneous tumor cell population
//! (drug-sensitive, drug-resistant, stem-like) and immune effector cells
//! under a drug dosing protocol, then derives clinician-facing outcome
//! metrics with an independent self-verification pass.
//!
//! The model is a simplified game-theoretic/compartmental approximation for
//! exploratory and educational use, not a validated predictive tool.
//!
//! Each run is a pure, single-threaded function of (parameters, seed):
//! identical inputs reproduce the trace bit for bit, and independent runs
//! share no state, so callers may dispatch them across threads freely.

pub mod clinical;
pub mod config;
pub mod dynamics;
pub mod error;
pub mod export;
pub mod state;
pub mod verification;

pub use clinical::{ClinicalSummary, OutcomeMapper, ResponseDataSource};
pub use config::{PatientProfile, SimulationParameters};
pub use dynamics::{PayoffMatrix, PopulationEngine, TreatmentProtocol, DEFAULT_SEED};
pub use error::SimError;
pub use state::{SimulationState, SimulationTrace, SubtypeVector, TumorSubtype};
pub use verification::VerificationReport;

/// Everything one simulation run produces
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// Full day-by-day history, length time_steps + 1
    pub trace: SimulationTrace,
    /// Derived clinical metrics
    pub summary: ClinicalSummary,
    /// Advisory self-consistency report
    pub verification: VerificationReport,
}

/// Run one simulation with the fixed default seed.
///
/// Fails with [`SimError::InvalidParameter`] before any computation for
/// out-of-range inputs, or [`SimError::NumericalInstability`] if the state
/// update produces a non-finite value mid-run.
pub fn simulate(params: &SimulationParameters) -> Result<SimulationOutcome, SimError> {
    simulate_seeded(params, DEFAULT_SEED)
}

/// Run one simulation with an explicit seed for the stochastic term
pub fn simulate_seeded(
    params: &SimulationParameters,
    seed: u64,
) -> Result<SimulationOutcome, SimError> {
    let mut engine = PopulationEngine::with_seed(params, seed)?;
    engine.run()?;
    let trace = engine.into_trace();

    let summary = OutcomeMapper::new(&trace, params).summarize();
    let verification = verification::verify(&trace, params, &summary);
    if !verification.calculation_verified {
        log::warn!(
            "verification discrepancy: fitness diff {:.3e}, volume diff {:.3e}, survival diff {:.3e}",
            verification.fitness.max_difference,
            verification.tumor_volume.difference,
            verification.survival_probability.difference
        );
    }

    Ok(SimulationOutcome {
        trace,
        summary,
        verification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_produces_consistent_outcome() {
        let params = SimulationParameters::default();
        let outcome = simulate(&params).unwrap();
        assert_eq!(outcome.trace.len(), params.time_steps as usize + 1);
        assert!((0.0..=1.0).contains(&outcome.summary.survival_probability));
        assert!(outcome.verification.calculation_verified);
    }

    #[test]
    fn test_simulate_is_deterministic_per_seed() {
        let params = SimulationParameters::default();
        let a = simulate_seeded(&params, 9).unwrap();
        let b = simulate_seeded(&params, 9).unwrap();
        assert_eq!(a.summary, b.summary);
        for (x, y) in a.trace.iter().zip(b.trace.iter()) {
            assert_eq!(x, y);
        }
    }

    #[test]
    fn test_simulate_rejects_invalid_parameters() {
        let params = SimulationParameters {
            time_steps: 0,
            ..Default::default()
        };
        assert!(matches!(
            simulate(&params),
            Err(SimError::InvalidParameter { .. })
        ));
    }
}
