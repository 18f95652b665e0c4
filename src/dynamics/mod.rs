//! Population dynamics engine and its sub-models.
//!
//! Advances the four-subtype population one day at a time:
//! 1. drug concentration from the dosing schedule,
//! 2. replicator fitness per tumor subtype,
//! 3. immune activation and predation,
//! 4. growth/kill update with the stochastic perturbation,
//! 5. drug-pressured sensitive-to-resistant mutation flux,
//! 6. bounded immune effector adjustment.
//!
//! The engine is a pure function of (parameters, seed): it owns its RNG,
//! touches no globals, and does no I/O, so identical inputs reproduce the
//! trace bit for bit. There is no early exit on eradication; the run always
//! covers the full horizon so consumers can observe post-eradication
//! flatlines.

mod fitness;
mod immune;
mod pharmacokinetics;
mod protocol;

pub use fitness::{
    FitnessEvaluator, PayoffMatrix, DRUG_KILL_COEFFS, RESISTANT_KILL_COEFF, SENSITIVE_KILL_COEFF,
    STEM_BASE_KILL_COEFF, STEM_SELF_RENEWAL_PROTECTION,
};
pub use immune::{
    ImmuneResponse, ImmuneSystem, ANTIGEN_HALF_SATURATION, BASE_PREDATION_RATE,
    EFFECTOR_HALF_SATURATION, EXHAUSTION_RATE, IMMUNE_SUSCEPTIBILITY,
};
pub use pharmacokinetics::{
    DoseSchedule, ADAPTIVE_BURDEN_THRESHOLD, METRONOMIC_PEAK_SCALE, METRONOMIC_PERIOD_DIVISOR,
};
pub use protocol::{ProtocolEffects, TreatmentProtocol};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::config::SimulationParameters;
use crate::error::SimError;
use crate::state::{SimulationState, SimulationTrace, SubtypeVector, TUMOR_SUBTYPE_COUNT};

/// Intrinsic fitness-to-growth scaling (fraction per unit fitness per day)
pub const GROWTH_RATE: f64 = 0.1;

/// Seed used when the caller does not supply one
pub const DEFAULT_SEED: u64 = 42;

/// Day-stepping engine for one simulation run.
///
/// Construct with [`PopulationEngine::new`] (validates parameters), then
/// call [`PopulationEngine::run`]. On a `NumericalInstability` error the
/// partial trace up to the last valid day stays available through
/// [`PopulationEngine::trace`].
pub struct PopulationEngine {
    time_steps: u32,
    chaos_level: f64,
    mutation_rate: f64,
    resistance_development: f64,
    schedule: DoseSchedule,
    evaluator: FitnessEvaluator,
    immune: ImmuneSystem,
    rng: ChaCha8Rng,
    populations: SubtypeVector,
    initial_burden: f64,
    trace: SimulationTrace,
}

impl PopulationEngine {
    /// Build an engine with the fixed default seed
    pub fn new(params: &SimulationParameters) -> Result<Self, SimError> {
        Self::with_seed(params, DEFAULT_SEED)
    }

    /// Build an engine with an explicit RNG seed
    pub fn with_seed(params: &SimulationParameters, seed: u64) -> Result<Self, SimError> {
        params.validate()?;

        let matrix = match &params.game_matrix {
            Some(rows) => PayoffMatrix::from_rows(rows)?,
            None => PayoffMatrix::baseline(),
        };
        let patient = params.patient();
        let populations = SubtypeVector::new(
            params.sensitive_cells,
            params.resistant_cells,
            params.stem_cells,
            params.immune_cells,
        );
        let effects = params.treatment_protocol.effects();

        Ok(Self {
            time_steps: params.time_steps,
            chaos_level: params.chaos_level,
            mutation_rate: params.mutation_rate,
            resistance_development: effects.resistance_development,
            schedule: DoseSchedule::new(
                params.treatment_protocol,
                params.drug_strength,
                params.drug_decay,
                params.dose_frequency,
                params.dose_intensity,
                patient.drug_clearance(),
            ),
            evaluator: FitnessEvaluator::new(matrix, params.treatment_protocol),
            immune: ImmuneSystem::new(
                patient.immune_competence(),
                params.treatment_protocol,
                params.immune_cells,
            ),
            rng: ChaCha8Rng::seed_from_u64(seed),
            initial_burden: populations.tumor_burden(),
            populations,
            trace: SimulationTrace::with_capacity(params.time_steps),
        })
    }

    /// Run the full horizon, recording day 0 through day `time_steps`.
    ///
    /// Aborts with `NumericalInstability` if any update produces a
    /// non-finite value; the partial trace remains readable.
    pub fn run(&mut self) -> Result<(), SimError> {
        for day in 0..=self.time_steps {
            let burden = self.populations.tumor_burden();
            let concentration =
                self.schedule
                    .concentration_for_day(day, burden, self.initial_burden);
            if !concentration.is_finite() {
                return Err(SimError::unstable(day, "drug concentration is non-finite"));
            }

            let fitness = self.evaluator.evaluate(&self.populations, concentration);
            if fitness.iter().any(|f| !f.is_finite()) {
                return Err(SimError::unstable(day, "fitness is non-finite"));
            }

            let response = self.immune.step(self.populations.immune, burden);

            self.trace.push(SimulationState {
                day,
                populations: self.populations,
                drug_concentration: concentration,
                fitness,
            });

            if day < self.time_steps {
                self.advance(day, concentration, &fitness, &response)?;
            }
        }
        Ok(())
    }

    /// Apply one day's transition to the population vector
    fn advance(
        &mut self,
        day: u32,
        concentration: f64,
        fitness: &[f64; TUMOR_SUBTYPE_COUNT],
        response: &ImmuneResponse,
    ) -> Result<(), SimError> {
        let current = self.populations.tumor_array();
        let mut next = [0.0; TUMOR_SUBTYPE_COUNT];

        for i in 0..TUMOR_SUBTYPE_COUNT {
            let deterministic =
                current[i] * (1.0 + GROWTH_RATE * fitness[i] - response.predation[i]);
            // Extinction is absorbing within the step but never halts the run
            next[i] = (deterministic + self.perturbation(current[i])).max(0.0);
        }

        // Treatment-induced clonal selection: drug pressure converts part of
        // the sensitive compartment to resistant
        let flux = (next[0] * self.mutation_rate * concentration * self.resistance_development)
            .min(next[0]);
        next[0] -= flux;
        next[1] += flux;

        let effectors = self
            .immune
            .adjust_effectors(self.populations.immune, response.activation);

        self.populations = SubtypeVector::new(next[0], next[1], next[2], effectors);
        if !self.populations.is_finite() {
            return Err(SimError::unstable(day + 1, "population count is non-finite"));
        }
        Ok(())
    }

    /// Zero-mean perturbation with magnitude `chaos_level · count`.
    ///
    /// Skipped entirely (no RNG draw) when chaos is off or the compartment
    /// is extinct, so the chaos_level = 0 path is exactly deterministic.
    fn perturbation(&mut self, count: f64) -> f64 {
        if self.chaos_level <= 0.0 || count <= 0.0 {
            return 0.0;
        }
        let z: f64 = self.rng.sample(StandardNormal);
        z * self.chaos_level * count
    }

    /// The trace recorded so far (full on success, partial after an error)
    pub fn trace(&self) -> &SimulationTrace {
        &self.trace
    }

    /// Consume the engine, yielding the trace
    pub fn into_trace(self) -> SimulationTrace {
        self.trace
    }
}
