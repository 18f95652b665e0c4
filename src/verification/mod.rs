//! Redundant recomputation of key quantities as a self-consistency check.
//!
//! Each check re-derives a primary output through a deliberately different
//! code path — explicit index loops instead of the evaluator's fold,
//! first-principles cell geometry instead of the mapper's collapsed
//! constant, the complementary sigmoid identity instead of the direct
//! logistic — and flags a discrepancy when the difference exceeds a fixed
//! per-quantity tolerance. The report is advisory only: it never feeds
//! back into the primary outputs and a failed check is data, not an error.

use serde::{Deserialize, Serialize};

use crate::clinical::{
    ClinicalSummary, CELL_VOLUME_UM3, PACKING_DENSITY, RISK_IMMUNE_WEIGHT, RISK_RESISTANT_WEIGHT,
    STROMAL_FRACTION, SURVIVAL_RISK_MIDPOINT, SURVIVAL_STEEPNESS,
};
use crate::config::SimulationParameters;
use crate::dynamics::{ImmuneSystem, PayoffMatrix, DRUG_KILL_COEFFS};
use crate::state::{SimulationTrace, SUBTYPE_COUNT, TUMOR_SUBTYPE_COUNT};

/// Tolerance for the fitness cross-check (both paths are closed-form over
/// the same recorded state, so they must agree to rounding)
pub const FITNESS_TOLERANCE: f64 = 1e-6;

/// Absolute floor of the tumor-volume tolerance (mm³); the effective
/// tolerance is the larger of this and 1% of the primary value
pub const VOLUME_TOLERANCE_MM3: f64 = 0.1;

/// Tolerance for the survival-probability cross-check
pub const SURVIVAL_TOLERANCE: f64 = 0.05;

/// Cross-check of the per-subtype fitness vector at the final day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessCheck {
    /// Engine-recorded fitness [sensitive, resistant, stem]
    pub primary: [f64; TUMOR_SUBTYPE_COUNT],
    /// Independently recomputed fitness
    pub alternate: [f64; TUMOR_SUBTYPE_COUNT],
    /// Largest absolute per-subtype difference
    pub max_difference: f64,
    /// True when max_difference is within tolerance
    pub valid: bool,
}

/// Cross-check of a scalar quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarCheck {
    pub primary: f64,
    pub alternate: f64,
    pub difference: f64,
    pub valid: bool,
}

/// Advisory report over all redundant checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub fitness: FitnessCheck,
    pub tumor_volume: ScalarCheck,
    pub survival_probability: ScalarCheck,
    /// Conjunction of the individual validity flags
    pub calculation_verified: bool,
}

/// Run all redundant checks against a completed trace and its summary
pub fn verify(
    trace: &SimulationTrace,
    params: &SimulationParameters,
    summary: &ClinicalSummary,
) -> VerificationReport {
    let fitness = verify_fitness(trace, params);
    let tumor_volume = verify_tumor_volume(trace, summary);
    let survival_probability = verify_survival(trace, params, summary);

    let calculation_verified = fitness.valid && tumor_volume.valid && survival_probability.valid;
    VerificationReport {
        fitness,
        tumor_volume,
        survival_probability,
        calculation_verified,
    }
}

/// Recompute final-day fitness with explicit loops over the protocol-scaled
/// payoff matrix
fn verify_fitness(trace: &SimulationTrace, params: &SimulationParameters) -> FitnessCheck {
    let last = match trace.last() {
        Some(state) => state,
        None => {
            return FitnessCheck {
                primary: [0.0; TUMOR_SUBTYPE_COUNT],
                alternate: [0.0; TUMOR_SUBTYPE_COUNT],
                max_difference: 0.0,
                valid: true,
            }
        }
    };

    let base = match &params.game_matrix {
        Some(rows) => PayoffMatrix::from_rows(rows).unwrap_or_else(|_| PayoffMatrix::baseline()),
        None => PayoffMatrix::baseline(),
    };
    let effects = params.treatment_protocol.effects();
    let matrix = base.with_immune_multiplier(effects.immune_multiplier);

    let counts = last.populations.as_array();
    let total: f64 = counts.iter().sum();
    let mut alternate = [0.0; TUMOR_SUBTYPE_COUNT];
    if total > 0.0 {
        for i in 0..TUMOR_SUBTYPE_COUNT {
            let mut expected_payoff = 0.0;
            for (j, &count) in counts.iter().enumerate().take(SUBTYPE_COUNT) {
                expected_payoff += matrix.get(i, j) * (count / total);
            }
            let kill = DRUG_KILL_COEFFS[i]
                * last.drug_concentration
                * effects.kill_multiplier(i);
            alternate[i] = expected_payoff - kill;
        }
    }

    let max_difference = last
        .fitness
        .iter()
        .zip(alternate.iter())
        .map(|(p, a)| (p - a).abs())
        .fold(0.0, f64::max);

    FitnessCheck {
        primary: last.fitness,
        alternate,
        max_difference,
        valid: max_difference <= FITNESS_TOLERANCE,
    }
}

/// Recompute tumor volume from first-principles cell geometry
fn verify_tumor_volume(trace: &SimulationTrace, summary: &ClinicalSummary) -> ScalarCheck {
    let tumor_cells = trace.final_tumor_burden();

    // Cellular volume, corrected for packing density, plus the stromal
    // component — step by step rather than via the mapper's constant
    let cellular_mm3 = tumor_cells * CELL_VOLUME_UM3 / 1.0e9;
    let alternate = cellular_mm3 / PACKING_DENSITY * (1.0 + STROMAL_FRACTION);

    let primary = summary.tumor_volume_mm3;
    let difference = (primary - alternate).abs();
    let tolerance = VOLUME_TOLERANCE_MM3.max(primary.abs() * 0.01);
    ScalarCheck {
        primary,
        alternate,
        difference,
        valid: difference <= tolerance,
    }
}

/// Recompute survival through an independent risk accumulation and the
/// complementary sigmoid form `e^{-x} / (1 + e^{-x})`
fn verify_survival(
    trace: &SimulationTrace,
    params: &SimulationParameters,
    summary: &ClinicalSummary,
) -> ScalarCheck {
    let baseline = trace.initial_tumor_burden();
    let final_burden = trace.final_tumor_burden();

    let burden_ratio = if baseline > 0.0 {
        final_burden / baseline
    } else {
        0.0
    };
    let resistant_fraction = trace
        .last()
        .map(|s| {
            let burden = s.populations.tumor_burden();
            if burden > 0.0 {
                s.populations.resistant / burden
            } else {
                0.0
            }
        })
        .unwrap_or(0.0);

    // Independent activation accumulation (explicit fold over a replayed
    // immune model)
    let mean_activation = if trace.is_empty() {
        0.0
    } else {
        let mut immune = ImmuneSystem::new(
            params.patient().immune_competence(),
            params.treatment_protocol,
            params.immune_cells,
        );
        let total = trace.iter().fold(0.0, |acc, s| {
            acc + immune
                .step(s.populations.immune, s.populations.tumor_burden())
                .activation
        });
        total / trace.len() as f64
    };

    let risk = (burden_ratio + RISK_RESISTANT_WEIGHT * resistant_fraction
        - RISK_IMMUNE_WEIGHT * mean_activation)
        .max(0.0);
    let x = SURVIVAL_STEEPNESS * (risk - SURVIVAL_RISK_MIDPOINT);
    let alternate = (-x).exp() / (1.0 + (-x).exp());

    let primary = summary.survival_probability;
    let difference = (primary - alternate).abs();
    ScalarCheck {
        primary,
        alternate,
        difference,
        valid: difference <= SURVIVAL_TOLERANCE,
    }
}
