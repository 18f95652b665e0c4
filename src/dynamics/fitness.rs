//! Replicator-dynamics fitness over the cross-subtype payoff matrix.
//!
//! Fitness of tumor subtype i is the expected payoff against the current
//! population composition minus a concentration-dependent drug kill term:
//!
//! `fitness_i = Σ_j payoff[i][j] · freq_j − kill_i · C · protocol_mult_i`
//!
//! Sensitive cells carry the full kill coefficient, resistant cells a much
//! lower one, and stem-like cells an intermediate coefficient dampened by a
//! self-renewal protection factor. An all-zero population has uniformly
//! zero fitness.
//!
//! References:
//! - Hofbauer J, Sigmund K. Evolutionary Games and Population Dynamics,
//!   Cambridge University Press 1998 (replicator equation)
//! - Basanta D et al. Br J Cancer. 2012;106:174-181 (tumor game theory)

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::state::{SubtypeVector, SUBTYPE_COUNT, TUMOR_SUBTYPE_COUNT};

use super::protocol::{ProtocolEffects, TreatmentProtocol};

/// Baseline drug kill coefficient for sensitive cells
pub const SENSITIVE_KILL_COEFF: f64 = 1.0;

/// Baseline drug kill coefficient for resistant cells
pub const RESISTANT_KILL_COEFF: f64 = 0.2;

/// Baseline drug kill coefficient for stem-like cells before protection
pub const STEM_BASE_KILL_COEFF: f64 = 0.6;

/// Fraction of drug kill absorbed by stem-cell self-renewal
pub const STEM_SELF_RENEWAL_PROTECTION: f64 = 0.25;

/// Effective per-subtype kill coefficients [sensitive, resistant, stem]
pub const DRUG_KILL_COEFFS: [f64; TUMOR_SUBTYPE_COUNT] = [
    SENSITIVE_KILL_COEFF,
    RESISTANT_KILL_COEFF,
    STEM_BASE_KILL_COEFF * (1.0 - STEM_SELF_RENEWAL_PROTECTION),
];

/// Square interaction matrix over all four subtypes.
///
/// Row/column order: sensitive, resistant, stem, immune. Entry `[i][j]` is
/// the payoff to subtype i when interacting with subtype j.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffMatrix {
    entries: [[f64; SUBTYPE_COUNT]; SUBTYPE_COUNT],
}

impl PayoffMatrix {
    /// Built-in baseline matrix.
    ///
    /// Entries are net growth benefit minus competition cost. Resistant
    /// cells pay a fitness cost for resistance (low same-type payoff), and
    /// stem cells self-limit in a crowded niche; the immune column encodes
    /// per-subtype visibility to immune attack. Under sustained dosing this
    /// game drives the selection sweep toward resistant dominance while
    /// keeping the total burden in check.
    pub fn baseline() -> Self {
        Self {
            entries: [
                [0.9, 0.6, 0.7, -0.3],
                [0.7, 0.3, 0.5, -0.2],
                [0.8, 0.5, 0.3, -0.1],
                [0.0, 0.0, 0.0, 0.0],
            ],
        }
    }

    /// Build a matrix from caller-supplied rows.
    ///
    /// Accepts a full 4×4 matrix covering all subtypes including immune
    /// cells, or a 3×3 tumor-only matrix (the short request shape)
    /// which is padded with the baseline immune row and column. Any other
    /// shape is rejected.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SimError> {
        let n = rows.len();
        if n != SUBTYPE_COUNT && n != TUMOR_SUBTYPE_COUNT {
            return Err(SimError::invalid(format!(
                "game_matrix must be {TUMOR_SUBTYPE_COUNT}x{TUMOR_SUBTYPE_COUNT} or \
                 {SUBTYPE_COUNT}x{SUBTYPE_COUNT}, got {n} rows"
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(SimError::invalid(format!(
                    "game_matrix row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(SimError::invalid(format!(
                    "game_matrix row {i} contains a non-finite entry"
                )));
            }
        }

        let mut entries = Self::baseline().entries;
        for (i, row) in rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                entries[i][j] = value;
            }
        }
        Ok(Self { entries })
    }

    /// Entry `[row][col]`
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries[row][col]
    }

    /// Scale the immune interaction column by a protocol multiplier.
    ///
    /// Protocols that boost immune engagement deepen the (negative) immune
    /// payoff seen by tumor subtypes; protocols that suppress it shrink it.
    pub fn with_immune_multiplier(mut self, multiplier: f64) -> Self {
        for row in self.entries.iter_mut().take(TUMOR_SUBTYPE_COUNT) {
            row[SUBTYPE_COUNT - 1] *= multiplier;
        }
        self
    }
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Per-subtype fitness evaluator for one simulation run
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    matrix: PayoffMatrix,
    effects: ProtocolEffects,
}

impl FitnessEvaluator {
    /// Build an evaluator from a resolved payoff matrix and protocol
    pub fn new(matrix: PayoffMatrix, protocol: TreatmentProtocol) -> Self {
        let effects = protocol.effects();
        Self {
            matrix: matrix.with_immune_multiplier(effects.immune_multiplier),
            effects,
        }
    }

    /// The protocol-adjusted payoff matrix in effect
    pub fn matrix(&self) -> &PayoffMatrix {
        &self.matrix
    }

    /// Fitness per tumor subtype for the given composition and drug level.
    ///
    /// Deterministic: the stochastic perturbation enters the population
    /// update, not the fitness, so recorded fitness values can always be
    /// recomputed from the recorded populations.
    pub fn evaluate(
        &self,
        populations: &SubtypeVector,
        drug_concentration: f64,
    ) -> [f64; TUMOR_SUBTYPE_COUNT] {
        let total = populations.total();
        if total <= 0.0 {
            return [0.0; TUMOR_SUBTYPE_COUNT];
        }

        let freqs = populations.frequencies();
        let mut fitness = [0.0; TUMOR_SUBTYPE_COUNT];
        for (i, fit) in fitness.iter_mut().enumerate() {
            let payoff: f64 = (0..SUBTYPE_COUNT)
                .map(|j| self.matrix.get(i, j) * freqs[j])
                .sum();
            let kill =
                DRUG_KILL_COEFFS[i] * drug_concentration * self.effects.kill_multiplier(i);
            *fit = payoff - kill;
        }
        fitness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population() -> SubtypeVector {
        SubtypeVector::new(100.0, 10.0, 5.0, 50.0)
    }

    #[test]
    fn test_zero_population_zero_fitness() {
        let eval = FitnessEvaluator::new(PayoffMatrix::baseline(), TreatmentProtocol::Continuous);
        let fitness = eval.evaluate(&SubtypeVector::zero(), 0.8);
        assert_eq!(fitness, [0.0; TUMOR_SUBTYPE_COUNT]);
    }

    #[test]
    fn test_no_drug_fitness_is_pure_payoff() {
        let eval = FitnessEvaluator::new(PayoffMatrix::baseline(), TreatmentProtocol::Continuous);
        let pop = population();
        let freqs = pop.frequencies();
        let fitness = eval.evaluate(&pop, 0.0);

        let matrix = PayoffMatrix::baseline();
        for i in 0..TUMOR_SUBTYPE_COUNT {
            let expected: f64 = (0..SUBTYPE_COUNT).map(|j| matrix.get(i, j) * freqs[j]).sum();
            assert!(
                (fitness[i] - expected).abs() < 1e-12,
                "subtype {i}: {} vs {}",
                fitness[i],
                expected
            );
        }
    }

    #[test]
    fn test_drug_hits_sensitive_hardest() {
        let eval = FitnessEvaluator::new(PayoffMatrix::baseline(), TreatmentProtocol::Continuous);
        let pop = population();
        let without = eval.evaluate(&pop, 0.0);
        let with = eval.evaluate(&pop, 0.8);

        let drops: Vec<f64> = without.iter().zip(with.iter()).map(|(a, b)| a - b).collect();
        assert!(drops[0] > drops[2], "sensitive should drop more than stem");
        assert!(drops[2] > drops[1], "stem should drop more than resistant");
    }

    #[test]
    fn test_stem_kill_coefficient_is_protected() {
        let expected = STEM_BASE_KILL_COEFF * (1.0 - STEM_SELF_RENEWAL_PROTECTION);
        assert!((DRUG_KILL_COEFFS[2] - expected).abs() < 1e-12);
        assert!(DRUG_KILL_COEFFS[2] > RESISTANT_KILL_COEFF);
        assert!(DRUG_KILL_COEFFS[2] < SENSITIVE_KILL_COEFF);
    }

    #[test]
    fn test_explicit_3x3_matrix_padded() {
        let rows = vec![
            vec![1.0, 0.5, 0.5],
            vec![0.5, 1.0, 0.5],
            vec![0.5, 0.5, 1.0],
        ];
        let matrix = PayoffMatrix::from_rows(&rows).unwrap();
        assert_eq!(matrix.get(0, 0), 1.0);
        assert_eq!(matrix.get(0, 1), 0.5);
        // Immune column comes from the baseline
        assert_eq!(matrix.get(0, 3), PayoffMatrix::baseline().get(0, 3));
    }

    #[test]
    fn test_malformed_matrix_rejected() {
        assert!(PayoffMatrix::from_rows(&[vec![1.0, 2.0]]).is_err());
        assert!(PayoffMatrix::from_rows(&[
            vec![1.0, 2.0, 3.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0, 3.0],
        ])
        .is_err());
        assert!(PayoffMatrix::from_rows(&[
            vec![1.0, 2.0, f64::NAN],
            vec![1.0, 2.0, 3.0],
            vec![1.0, 2.0, 3.0],
        ])
        .is_err());
    }

    #[test]
    fn test_protocol_scales_immune_column() {
        let eval = FitnessEvaluator::new(PayoffMatrix::baseline(), TreatmentProtocol::Metronomic);
        let baseline = PayoffMatrix::baseline();
        let boosted = eval.matrix();
        let mult = TreatmentProtocol::Metronomic.effects().immune_multiplier;
        for i in 0..TUMOR_SUBTYPE_COUNT {
            assert!((boosted.get(i, 3) - baseline.get(i, 3) * mult).abs() < 1e-12);
        }
        // Immune row untouched
        assert_eq!(boosted.get(3, 3), baseline.get(3, 3));
    }
}
