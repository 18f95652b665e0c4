//! Simulation parameter bundle and validation.
//!
//! Field names match the JSON request contract of the serving layer
//! (`sensitive_cells`, `drug_strength`, ...), so a request body
//! deserializes directly into `SimulationParameters`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dynamics::TreatmentProtocol;
use crate::error::SimError;

/// Immutable input bundle for one simulation run.
///
/// Every field carries a serving default, so a partial JSON request (or
/// `SimulationParameters::default()`) yields a runnable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Initial drug-sensitive tumor cell count
    pub sensitive_cells: f64,
    /// Initial drug-resistant tumor cell count
    pub resistant_cells: f64,
    /// Initial stem-like tumor cell count
    pub stem_cells: f64,
    /// Initial immune effector cell count
    pub immune_cells: f64,
    /// Dosing schedule policy
    pub treatment_protocol: TreatmentProtocol,
    /// Drug potency in [0, 1]
    pub drug_strength: f64,
    /// First-order elimination rate (per day, > 0)
    pub drug_decay: f64,
    /// Days between scheduled doses (> 0)
    pub dose_frequency: f64,
    /// Dose scaling multiplier (> 0); also the concentration ceiling
    pub dose_intensity: f64,
    /// Patient age in years
    pub patient_age: u32,
    /// Drug clearance multiplier (1.0 = reference metabolism, > 0)
    pub patient_metabolism: f64,
    /// Immune competence multiplier (0 disables immune predation)
    pub patient_immune_status: f64,
    /// Organ function multiplier (> 0; lower = more toxicity exposure)
    pub patient_organ_function: f64,
    /// Fraction of drug-pressured sensitive cells converting to resistant
    /// per unit concentration per day, in [0, 1)
    pub mutation_rate: f64,
    /// Magnitude of the zero-mean stochastic perturbation (>= 0)
    pub chaos_level: f64,
    /// Simulation horizon in days (> 0); the trace has time_steps + 1 states
    pub time_steps: u32,
    /// Optional explicit payoff matrix (4x4, or 3x3 tumor-only)
    pub game_matrix: Option<Vec<Vec<f64>>>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            sensitive_cells: 100.0,
            resistant_cells: 10.0,
            stem_cells: 5.0,
            immune_cells: 50.0,
            treatment_protocol: TreatmentProtocol::Continuous,
            drug_strength: 0.8,
            drug_decay: 0.1,
            dose_frequency: 7.0,
            dose_intensity: 1.0,
            patient_age: 55,
            patient_metabolism: 1.0,
            patient_immune_status: 1.0,
            patient_organ_function: 1.0,
            mutation_rate: 0.01,
            chaos_level: 0.05,
            time_steps: 100,
            game_matrix: None,
        }
    }
}

impl SimulationParameters {
    /// Load parameters from a JSON file, or fall back to defaults.
    ///
    /// Used by the CLI; the library API takes the struct directly.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(params) => {
                    log::info!("Loaded simulation parameters from {:?}", path.as_ref());
                    params
                }
                Err(e) => {
                    log::warn!("Failed to parse parameters: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Parameter file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Reject out-of-range or structurally invalid inputs.
    ///
    /// Called before any computation; a failed run never produces a trace.
    pub fn validate(&self) -> Result<(), SimError> {
        for (name, value) in [
            ("sensitive_cells", self.sensitive_cells),
            ("resistant_cells", self.resistant_cells),
            ("stem_cells", self.stem_cells),
            ("immune_cells", self.immune_cells),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::invalid(format!(
                    "{name} must be a non-negative finite number, got {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.drug_strength) {
            return Err(SimError::invalid(format!(
                "drug_strength must be in [0, 1], got {}",
                self.drug_strength
            )));
        }
        if !self.drug_decay.is_finite() || self.drug_decay <= 0.0 {
            return Err(SimError::invalid(format!(
                "drug_decay must be > 0 (non-decaying concentration is unphysical), got {}",
                self.drug_decay
            )));
        }
        if !self.dose_frequency.is_finite() || self.dose_frequency <= 0.0 {
            return Err(SimError::invalid(format!(
                "dose_frequency must be > 0 days, got {}",
                self.dose_frequency
            )));
        }
        if !self.dose_intensity.is_finite() || self.dose_intensity <= 0.0 {
            return Err(SimError::invalid(format!(
                "dose_intensity must be > 0, got {}",
                self.dose_intensity
            )));
        }

        for (name, value) in [
            ("patient_metabolism", self.patient_metabolism),
            ("patient_immune_status", self.patient_immune_status),
            ("patient_organ_function", self.patient_organ_function),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::invalid(format!(
                    "{name} must be a non-negative finite number, got {value}"
                )));
            }
        }
        if self.patient_metabolism == 0.0 {
            return Err(SimError::invalid("patient_metabolism must be > 0"));
        }
        if self.patient_organ_function == 0.0 {
            return Err(SimError::invalid("patient_organ_function must be > 0"));
        }

        if !(0.0..1.0).contains(&self.mutation_rate) {
            return Err(SimError::invalid(format!(
                "mutation_rate must be in [0, 1), got {}",
                self.mutation_rate
            )));
        }
        if !self.chaos_level.is_finite() || self.chaos_level < 0.0 {
            return Err(SimError::invalid(format!(
                "chaos_level must be >= 0, got {}",
                self.chaos_level
            )));
        }
        if self.time_steps == 0 {
            return Err(SimError::invalid("time_steps must be > 0"));
        }

        if let Some(rows) = &self.game_matrix {
            // Shape/finiteness check; the padded matrix is built later
            crate::dynamics::PayoffMatrix::from_rows(rows)?;
        }

        Ok(())
    }

    /// Patient modifier view over the per-patient fields
    pub fn patient(&self) -> PatientProfile {
        PatientProfile {
            age: self.patient_age,
            metabolism: self.patient_metabolism,
            immune_status: self.patient_immune_status,
            organ_function: self.patient_organ_function,
        }
    }
}

/// Patient modifiers affecting pharmacokinetics, immune competence,
/// and toxicity exposure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    /// Age in years
    pub age: u32,
    /// Drug clearance multiplier (1.0 = reference)
    pub metabolism: f64,
    /// Immune competence multiplier (0 disables immune effects)
    pub immune_status: f64,
    /// Organ function multiplier (lower = less detoxification capacity)
    pub organ_function: f64,
}

impl PatientProfile {
    /// Clearance modifier for pharmacokinetics
    pub fn drug_clearance(&self) -> f64 {
        self.metabolism
    }

    /// Age-adjusted immune competence.
    ///
    /// Immunosenescence dampens competence past 70; younger patients get a
    /// modest boost. A zero immune_status always yields zero competence.
    pub fn immune_competence(&self) -> f64 {
        let age_factor = if self.age >= 70 {
            0.85
        } else if self.age < 40 {
            1.1
        } else {
            1.0
        };
        self.immune_status * age_factor
    }

    /// Toxicity susceptibility (inverse of organ function)
    pub fn toxicity_susceptibility(&self) -> f64 {
        1.0 / self.organ_function
    }
}
