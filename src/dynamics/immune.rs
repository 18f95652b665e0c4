//! Immune activation, exhaustion, and tumor predation.
//!
//! Activation saturates with antigen load (tumor burden) and is scaled by
//! the patient's immune competence. Exhaustion accumulates with cumulative
//! burden exposure and subtracts from activation, modeling tumor-mediated
//! suppression; net activation is floored at zero. Predation against each
//! tumor subtype scales with net activation, the subtype's immune
//! visibility, and a saturating function of the effector cell count.
//!
//! References:
//! - Kuznetsov VA et al. Bull Math Biol. 1994;56:295-321 (tumor-immune ODEs)
//! - Wherry EJ. Nat Immunol. 2011;12:492-499 (T cell exhaustion)

use crate::state::TUMOR_SUBTYPE_COUNT;

use super::protocol::TreatmentProtocol;

/// Tumor burden at which activation reaches half its maximum (cells)
pub const ANTIGEN_HALF_SATURATION: f64 = 500.0;

/// Immune cell count at which predation reaches half its maximum (cells)
pub const EFFECTOR_HALF_SATURATION: f64 = 100.0;

/// Maximum per-day kill fraction at full activation and saturation
pub const BASE_PREDATION_RATE: f64 = 0.5;

/// Exhaustion accumulated per unit of normalized cumulative exposure
pub const EXHAUSTION_RATE: f64 = 0.005;

/// Immune visibility per tumor subtype [sensitive, resistant, stem].
/// Sensitive cells present the most antigen; stem-like cells largely evade.
pub const IMMUNE_SUSCEPTIBILITY: [f64; TUMOR_SUBTYPE_COUNT] = [1.0, 0.7, 0.3];

/// Bounded fractional adjustment of the effector count per day
const EFFECTOR_ADJUSTMENT_RATE: f64 = 0.1;

/// One day's immune output: net activation and per-subtype predation rates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImmuneResponse {
    /// Net activation in [0, 1] after exhaustion
    pub activation: f64,
    /// Per-day kill fraction per tumor subtype [sensitive, resistant, stem]
    pub predation: [f64; TUMOR_SUBTYPE_COUNT],
}

/// Immune compartment model for one simulation run.
///
/// Carries the cumulative exposure that drives exhaustion, so one instance
/// belongs to exactly one run.
#[derive(Debug, Clone)]
pub struct ImmuneSystem {
    /// Patient immune competence (immune_status, age-adjusted)
    competence: f64,
    /// Protocol multiplier on predation
    protocol_multiplier: f64,
    /// Effector count supplied at day 0, anchor for the activation target
    initial_effectors: f64,
    /// Cumulative tumor burden seen so far (cell-days)
    cumulative_exposure: f64,
}

impl ImmuneSystem {
    /// Build the immune model for a run
    pub fn new(competence: f64, protocol: TreatmentProtocol, initial_effectors: f64) -> Self {
        Self {
            competence,
            protocol_multiplier: protocol.effects().immune_multiplier,
            initial_effectors,
            cumulative_exposure: 0.0,
        }
    }

    /// Compute activation and predation for one day, then accrue exposure.
    ///
    /// Must be called exactly once per simulated day, in order.
    pub fn step(&mut self, effector_cells: f64, tumor_burden: f64) -> ImmuneResponse {
        let activation = self.net_activation(tumor_burden);
        let engagement = if effector_cells > 0.0 {
            effector_cells / (effector_cells + EFFECTOR_HALF_SATURATION)
        } else {
            0.0
        };

        let mut predation = [0.0; TUMOR_SUBTYPE_COUNT];
        for (i, pred) in predation.iter_mut().enumerate() {
            *pred = activation
                * IMMUNE_SUSCEPTIBILITY[i]
                * engagement
                * BASE_PREDATION_RATE
                * self.protocol_multiplier;
        }

        self.cumulative_exposure += tumor_burden;
        ImmuneResponse {
            activation,
            predation,
        }
    }

    /// Saturating activation minus the exhaustion penalty, in [0, 1]
    fn net_activation(&self, tumor_burden: f64) -> f64 {
        let saturating = if tumor_burden > 0.0 {
            self.competence * tumor_burden / (tumor_burden + ANTIGEN_HALF_SATURATION)
        } else {
            0.0
        };
        let exhaustion = EXHAUSTION_RATE * self.cumulative_exposure / ANTIGEN_HALF_SATURATION;
        (saturating - exhaustion).clamp(0.0, 1.0)
    }

    /// Move the effector count toward its activation target with a bounded
    /// per-day adjustment
    pub fn adjust_effectors(&self, current: f64, activation: f64) -> f64 {
        let target = self.initial_effectors * (0.5 + 2.0 * activation);
        let limit = EFFECTOR_ADJUSTMENT_RATE * current.max(1.0);
        let step = (target - current).clamp(-limit, limit);
        (current + step).max(0.0)
    }
}
