//! CSV time-series export of a finished trace.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::state::{SimulationState, SimulationTrace};

/// One CSV row per simulated day
#[derive(Debug, Clone, Serialize)]
pub struct DayRecord {
    /// Day index
    pub day: u32,
    /// Sensitive tumor cell count
    pub sensitive: f64,
    /// Resistant tumor cell count
    pub resistant: f64,
    /// Stem-like tumor cell count
    pub stemcell: f64,
    /// Immune effector cell count
    pub immunecell: f64,
    /// Tumor burden (non-immune subtypes)
    pub tumor_burden: f64,
    /// Drug concentration
    pub drug_level: f64,
    /// Fitness of sensitive cells
    pub fitness_sensitive: f64,
    /// Fitness of resistant cells
    pub fitness_resistant: f64,
    /// Fitness of stem-like cells
    pub fitness_stemcell: f64,
}

impl From<&SimulationState> for DayRecord {
    fn from(state: &SimulationState) -> Self {
        Self {
            day: state.day,
            sensitive: state.populations.sensitive,
            resistant: state.populations.resistant,
            stemcell: state.populations.stem,
            immunecell: state.populations.immune,
            tumor_burden: state.populations.tumor_burden(),
            drug_level: state.drug_concentration,
            fitness_sensitive: state.fitness[0],
            fitness_resistant: state.fitness[1],
            fitness_stemcell: state.fitness[2],
        }
    }
}

/// Export a trace to `exports/timeseries_YYYYMMDD_HHMMSS.csv`.
///
/// Creates the exports directory if needed; returns the written path.
pub fn export_csv(trace: &SimulationTrace) -> Result<PathBuf> {
    let dir = PathBuf::from("exports");
    std::fs::create_dir_all(&dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("timeseries_{}.csv", timestamp));
    export_csv_to(trace, &path)?;
    Ok(path)
}

/// Export a trace to a specific file
pub fn export_csv_to(trace: &SimulationTrace, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for state in trace {
        writer.serialize(DayRecord::from(state))?;
    }
    writer.flush()?;
    log::info!("CSV export written: {}", path.display());
    Ok(())
}
