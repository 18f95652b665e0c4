//! JSON export of a finished run.
//!
//! The trace is serialized as parallel arrays per subtype/day (the shape
//! the charting frontend consumes), with the summary and verification
//! report as flat objects.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::clinical::ClinicalSummary;
use crate::config::SimulationParameters;
use crate::state::{SimulationTrace, TUMOR_SUBTYPE_COUNT};
use crate::verification::VerificationReport;
use crate::SimulationOutcome;

/// Parallel-array view of a trace, one entry per recorded day
#[derive(Debug, Clone, Serialize)]
pub struct TraceExport {
    /// Day indices 0..=time_steps
    pub time_points: Vec<u32>,
    /// Sensitive tumor cell counts
    pub sensitive: Vec<f64>,
    /// Resistant tumor cell counts
    pub resistant: Vec<f64>,
    /// Stem-like tumor cell counts
    pub stemcell: Vec<f64>,
    /// Immune effector cell counts
    pub immunecell: Vec<f64>,
    /// Total population (all four subtypes)
    pub total: Vec<f64>,
    /// Tumor burden (non-immune subtypes)
    pub tumor_burden: Vec<f64>,
    /// Drug concentration per day
    pub drug_level: Vec<f64>,
    /// Fitness per tumor subtype per day [sensitive, resistant, stem]
    pub fitness: Vec<[f64; TUMOR_SUBTYPE_COUNT]>,
}

impl From<&SimulationTrace> for TraceExport {
    fn from(trace: &SimulationTrace) -> Self {
        let n = trace.len();
        let mut export = Self {
            time_points: Vec::with_capacity(n),
            sensitive: Vec::with_capacity(n),
            resistant: Vec::with_capacity(n),
            stemcell: Vec::with_capacity(n),
            immunecell: Vec::with_capacity(n),
            total: Vec::with_capacity(n),
            tumor_burden: Vec::with_capacity(n),
            drug_level: Vec::with_capacity(n),
            fitness: Vec::with_capacity(n),
        };
        for state in trace {
            export.time_points.push(state.day);
            export.sensitive.push(state.populations.sensitive);
            export.resistant.push(state.populations.resistant);
            export.stemcell.push(state.populations.stem);
            export.immunecell.push(state.populations.immune);
            export.total.push(state.populations.total());
            export.tumor_burden.push(state.populations.tumor_burden());
            export.drug_level.push(state.drug_concentration);
            export.fitness.push(state.fitness);
        }
        export
    }
}

/// Full export payload for one run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationExport<'a> {
    /// Export timestamp (RFC 3339)
    pub exported_at: String,
    /// Export version for compatibility
    pub version: &'static str,
    /// Input parameters (wire-contract field names)
    pub parameters: &'a SimulationParameters,
    /// Day-by-day history as parallel arrays
    pub simulation_data: TraceExport,
    /// Flat clinical summary
    pub clinical_summary: &'a ClinicalSummary,
    /// Flat verification report
    pub verification_report: &'a VerificationReport,
}

impl<'a> SimulationExport<'a> {
    /// Build the payload for a finished run
    pub fn new(params: &'a SimulationParameters, outcome: &'a SimulationOutcome) -> Self {
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: "1.0.0",
            parameters: params,
            simulation_data: TraceExport::from(&outcome.trace),
            clinical_summary: &outcome.summary,
            verification_report: &outcome.verification,
        }
    }
}

/// Export a finished run to `exports/simulation_YYYYMMDD_HHMMSS.json`.
///
/// Creates the exports directory if needed; returns the written path.
pub fn export_json(params: &SimulationParameters, outcome: &SimulationOutcome) -> Result<PathBuf> {
    let dir = PathBuf::from("exports");
    std::fs::create_dir_all(&dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("simulation_{}.json", timestamp));
    export_json_to(params, outcome, &path)?;
    Ok(path)
}

/// Export a finished run to a specific file
pub fn export_json_to(
    params: &SimulationParameters,
    outcome: &SimulationOutcome,
    path: &Path,
) -> Result<()> {
    let export = SimulationExport::new(params, outcome);
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &export)?;
    log::info!("JSON export written: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate;

    #[test]
    fn test_parallel_arrays_have_equal_length() {
        let params = SimulationParameters {
            time_steps: 20,
            ..Default::default()
        };
        let outcome = simulate(&params).unwrap();
        let export = TraceExport::from(&outcome.trace);
        assert_eq!(export.time_points.len(), 21);
        assert_eq!(export.sensitive.len(), 21);
        assert_eq!(export.fitness.len(), 21);
        assert_eq!(export.time_points[0], 0);
        assert_eq!(export.time_points[20], 20);
    }

    #[test]
    fn test_totals_match_components() {
        let params = SimulationParameters {
            time_steps: 10,
            ..Default::default()
        };
        let outcome = simulate(&params).unwrap();
        let export = TraceExport::from(&outcome.trace);
        for i in 0..export.time_points.len() {
            let sum = export.sensitive[i] + export.resistant[i] + export.stemcell[i];
            assert!((export.tumor_burden[i] - sum).abs() < 1e-9);
            assert!((export.total[i] - (sum + export.immunecell[i])).abs() < 1e-9);
        }
    }

    #[test]
    fn test_payload_shape() {
        let params = SimulationParameters {
            time_steps: 5,
            ..Default::default()
        };
        let outcome = simulate(&params).unwrap();
        let export = SimulationExport::new(&params, &outcome);
        let json = serde_json::to_value(&export).unwrap();
        assert!(json["simulation_data"]["drug_level"].is_array());
        assert!(json["clinical_summary"]["survival_probability"].is_number());
        assert!(json["verification_report"]["calculation_verified"].is_boolean());
        assert_eq!(json["parameters"]["time_steps"], 5);
    }
}
