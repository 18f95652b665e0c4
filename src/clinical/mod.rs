//! Clinical outcome mapping from a completed trace.
//!
//! Reduces a day-by-day trajectory to the scalar/categorical metrics a
//! clinician-facing dashboard displays: tumor volume, a RECIST-like
//! response class, disease control and response rates, a survival estimate
//! from a hazard proxy, toxicity and quality-of-life categories, and the
//! dominant surviving subtype.
//!
//! Threshold and multiplier constants are a single canonical set,
//! documented in DESIGN.md.
//!
//! References:
//! - Eisenhauer EA et al. Eur J Cancer. 2009;45:228-247 (RECIST 1.1)
//! - Del Monte U. Cell Cycle. 2009;8:505-506 (cells per cm³ of tumor)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SimulationParameters;
use crate::dynamics::ImmuneSystem;
use crate::state::{SimulationTrace, TumorSubtype};

/// Average tumor cell volume (μm³)
pub const CELL_VOLUME_UM3: f64 = 2000.0;

/// Fraction of tumor volume occupied by cells
pub const PACKING_DENSITY: f64 = 0.7;

/// Stromal component added on top of the cellular volume
pub const STROMAL_FRACTION: f64 = 0.3;

/// Collapsed cells-to-mm³ conversion used by the mapper.
/// `CELL_VOLUME_UM3 / 1e9 / PACKING_DENSITY · (1 + STROMAL_FRACTION)`
pub const CELLS_TO_MM3: f64 =
    CELL_VOLUME_UM3 / 1.0e9 / PACKING_DENSITY * (1.0 + STROMAL_FRACTION);

/// Final tumor burden below this count is eradication
pub const ERADICATION_EPSILON: f64 = 1.0;

/// RECIST-like percent-change cutoffs
pub const RECIST_COMPLETE_RESPONSE_PERCENT: f64 = -99.0;
pub const RECIST_PARTIAL_RESPONSE_PERCENT: f64 = -30.0;
pub const RECIST_PROGRESSION_PERCENT: f64 = 20.0;

/// A day counts as "controlled" while burden stays within this multiple
/// of baseline
pub const DISEASE_CONTROL_MARGIN: f64 = 1.2;

/// Hazard proxy weights and logistic shape for the survival estimate
pub const RISK_RESISTANT_WEIGHT: f64 = 0.5;
pub const RISK_IMMUNE_WEIGHT: f64 = 0.4;
pub const SURVIVAL_STEEPNESS: f64 = 1.2;
pub const SURVIVAL_RISK_MIDPOINT: f64 = 2.0;

/// Ceiling of the median-survival transform (months)
pub const MEDIAN_SURVIVAL_CEILING_MONTHS: f64 = 60.0;

/// Toxicity-index bucket boundaries (Mild/Moderate/Severe/Life-threatening)
pub const TOXICITY_MODERATE_THRESHOLD: f64 = 0.3;
pub const TOXICITY_SEVERE_THRESHOLD: f64 = 0.9;
pub const TOXICITY_CRITICAL_THRESHOLD: f64 = 1.5;

/// RECIST-like best-response classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseClassification {
    /// Tumor effectively eradicated (≤ −99% or eradication flag)
    CompleteResponse,
    /// ≥ 30% volume reduction
    PartialResponse,
    /// Between −30% and +20%
    StableDisease,
    /// > +20% growth
    ProgressiveDisease,
}

impl fmt::Display for ResponseClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResponseClassification::CompleteResponse => "Complete Response (CR)",
            ResponseClassification::PartialResponse => "Partial Response (PR)",
            ResponseClassification::StableDisease => "Stable Disease (SD)",
            ResponseClassification::ProgressiveDisease => "Progressive Disease (PD)",
        };
        f.write_str(s)
    }
}

/// Side-effect severity, ordered from mild to life-threatening
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SideEffectSeverity {
    Mild,
    Moderate,
    Severe,
    LifeThreatening,
}

impl fmt::Display for SideEffectSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SideEffectSeverity::Mild => "Mild",
            SideEffectSeverity::Moderate => "Moderate",
            SideEffectSeverity::Severe => "Severe",
            SideEffectSeverity::LifeThreatening => "Life-threatening",
        };
        f.write_str(s)
    }
}

/// Quality-of-life category, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityOfLife {
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl fmt::Display for QualityOfLife {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityOfLife::Good => "Good",
            QualityOfLife::Fair => "Fair",
            QualityOfLife::Poor => "Poor",
            QualityOfLife::VeryPoor => "Very poor",
        };
        f.write_str(s)
    }
}

/// Largest surviving tumor compartment, or none after eradication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantSubtype {
    Sensitive,
    Resistant,
    Stemcell,
    None,
}

impl From<Option<TumorSubtype>> for DominantSubtype {
    fn from(value: Option<TumorSubtype>) -> Self {
        match value {
            Some(TumorSubtype::Sensitive) => DominantSubtype::Sensitive,
            Some(TumorSubtype::Resistant) => DominantSubtype::Resistant,
            Some(TumorSubtype::Stem) => DominantSubtype::Stemcell,
            None => DominantSubtype::None,
        }
    }
}

impl fmt::Display for DominantSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DominantSubtype::Sensitive => "sensitive",
            DominantSubtype::Resistant => "resistant",
            DominantSubtype::Stemcell => "stemcell",
            DominantSubtype::None => "none",
        };
        f.write_str(s)
    }
}

/// Whether response figures come from the measured trajectory or a
/// protocol-based expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseDataSource {
    /// Rates derived from the simulated tumor shrinkage
    #[default]
    Measured,
    /// Rates quoted from the protocol's expected-response range
    ProtocolEstimate,
}

/// Derived, read-only clinical snapshot of one completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalSummary {
    /// Final tumor volume estimate (mm³)
    pub tumor_volume_mm3: f64,
    /// RECIST-like best-response class
    pub response_classification: ResponseClassification,
    /// Percent of days with burden within the control margin of baseline
    pub disease_control_rate_percent: f64,
    /// Best measured shrinkage percent (Measured source only)
    pub response_rate_percent: Option<f64>,
    /// Protocol expected-response range (ProtocolEstimate source only)
    pub expected_response_range_percent: Option<[f64; 2]>,
    /// Which of the two response figures above is populated
    pub response_data_source: ResponseDataSource,
    /// Survival probability in [0, 1] from the hazard proxy
    pub survival_probability: f64,
    /// Median survival estimate (months)
    pub median_survival_months: f64,
    /// Quality-of-life category
    pub quality_of_life: QualityOfLife,
    /// Side-effect severity category
    pub side_effects: SideEffectSeverity,
    /// Normalized toxicity-exposure index behind the categories
    pub toxicity_index: f64,
    /// Composite efficacy score in [0, 100]
    pub treatment_efficacy_score: f64,
    /// Largest surviving tumor compartment
    pub dominant_subtype: DominantSubtype,
    /// True iff final tumor burden < eradication epsilon
    pub eradicated: bool,
}

/// Maps a finished trace to a [`ClinicalSummary`]
pub struct OutcomeMapper<'a> {
    trace: &'a SimulationTrace,
    params: &'a SimulationParameters,
}

impl<'a> OutcomeMapper<'a> {
    pub fn new(trace: &'a SimulationTrace, params: &'a SimulationParameters) -> Self {
        Self { trace, params }
    }

    /// Produce the summary with measured response figures
    pub fn summarize(&self) -> ClinicalSummary {
        self.summarize_with_source(ResponseDataSource::Measured)
    }

    /// Produce the summary, choosing where response figures come from
    pub fn summarize_with_source(&self, source: ResponseDataSource) -> ClinicalSummary {
        let baseline = self.trace.initial_tumor_burden();
        let final_burden = self.trace.final_tumor_burden();
        let eradicated = final_burden < ERADICATION_EPSILON;

        let survival_probability = self.survival_probability();
        let toxicity_index = self.toxicity_index();
        let side_effects = side_effect_category(toxicity_index);

        let (response_rate, expected_range) = match source {
            ResponseDataSource::Measured => (Some(self.best_response_percent()), None),
            ResponseDataSource::ProtocolEstimate => {
                let (lo, hi) = self.params.treatment_protocol.expected_response_range();
                (None, Some([lo, hi]))
            }
        };

        ClinicalSummary {
            tumor_volume_mm3: tumor_volume_mm3(final_burden),
            response_classification: self.classify_response(baseline, final_burden, eradicated),
            disease_control_rate_percent: self.disease_control_rate(baseline),
            response_rate_percent: response_rate,
            expected_response_range_percent: expected_range,
            response_data_source: source,
            survival_probability,
            median_survival_months: median_survival_months(survival_probability),
            quality_of_life: quality_of_life_category(survival_probability, toxicity_index),
            side_effects,
            toxicity_index,
            treatment_efficacy_score: self.efficacy_score(baseline, final_burden, survival_probability),
            dominant_subtype: self.dominant_subtype(eradicated),
            eradicated,
        }
    }

    /// RECIST-like bucket from the percent volume change since baseline.
    /// Eradication always classifies as Complete Response.
    fn classify_response(
        &self,
        baseline: f64,
        final_burden: f64,
        eradicated: bool,
    ) -> ResponseClassification {
        if eradicated {
            return ResponseClassification::CompleteResponse;
        }
        if baseline <= 0.0 {
            // Grew from nothing: any surviving burden is progression
            return ResponseClassification::ProgressiveDisease;
        }
        let percent_change = (final_burden - baseline) / baseline * 100.0;
        if percent_change <= RECIST_COMPLETE_RESPONSE_PERCENT {
            ResponseClassification::CompleteResponse
        } else if percent_change <= RECIST_PARTIAL_RESPONSE_PERCENT {
            ResponseClassification::PartialResponse
        } else if percent_change <= RECIST_PROGRESSION_PERCENT {
            ResponseClassification::StableDisease
        } else {
            ResponseClassification::ProgressiveDisease
        }
    }

    /// Percent of recorded days with burden within the control margin
    fn disease_control_rate(&self, baseline: f64) -> f64 {
        if self.trace.is_empty() || baseline <= 0.0 {
            return if self.trace.final_tumor_burden() <= 0.0 { 100.0 } else { 0.0 };
        }
        let controlled = self
            .trace
            .iter()
            .filter(|s| s.populations.tumor_burden() <= DISEASE_CONTROL_MARGIN * baseline)
            .count();
        controlled as f64 / self.trace.len() as f64 * 100.0
    }

    /// Best shrinkage achieved at any recorded day, as a percent of baseline
    fn best_response_percent(&self) -> f64 {
        let baseline = self.trace.initial_tumor_burden();
        if baseline <= 0.0 {
            return 0.0;
        }
        self.trace
            .iter()
            .map(|s| (baseline - s.populations.tumor_burden()) / baseline * 100.0)
            .fold(0.0, f64::max)
            .clamp(0.0, 100.0)
    }

    /// Hazard-proxy survival probability.
    ///
    /// Risk rises with the residual burden ratio and the resistant
    /// fraction, falls with sustained immune activation; a logistic maps
    /// risk into a bounded probability.
    fn survival_probability(&self) -> f64 {
        let risk = self.survival_risk();
        logistic(-SURVIVAL_STEEPNESS * (risk - SURVIVAL_RISK_MIDPOINT))
    }

    fn survival_risk(&self) -> f64 {
        let baseline = self.trace.initial_tumor_burden();
        let final_burden = self.trace.final_tumor_burden();
        let burden_ratio = if baseline > 0.0 { final_burden / baseline } else { 0.0 };
        let resistant_fraction = self.final_resistant_fraction();
        let immune_activity = mean_immune_activation(self.trace, self.params);
        (burden_ratio + RISK_RESISTANT_WEIGHT * resistant_fraction
            - RISK_IMMUNE_WEIGHT * immune_activity)
            .max(0.0)
    }

    fn final_resistant_fraction(&self) -> f64 {
        let final_burden = self.trace.final_tumor_burden();
        if final_burden <= 0.0 {
            return 0.0;
        }
        self.trace
            .last()
            .map(|s| s.populations.resistant / final_burden)
            .unwrap_or(0.0)
    }

    /// Mean daily drug exposure weighted by protocol toxicity and inverse
    /// organ function
    fn toxicity_index(&self) -> f64 {
        if self.trace.is_empty() {
            return 0.0;
        }
        let mean_concentration: f64 = self
            .trace
            .iter()
            .map(|s| s.drug_concentration)
            .sum::<f64>()
            / self.trace.len() as f64;
        mean_concentration
            * self.params.treatment_protocol.effects().toxicity_multiplier
            * self.params.patient().toxicity_susceptibility()
    }

    fn efficacy_score(&self, baseline: f64, final_burden: f64, survival: f64) -> f64 {
        let reduction = if baseline > 0.0 {
            ((baseline - final_burden) / baseline).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let resistant_fraction = self.final_resistant_fraction();
        (100.0 * (0.5 * reduction + 0.3 * survival + 0.2 * (1.0 - resistant_fraction)))
            .clamp(0.0, 100.0)
    }

    fn dominant_subtype(&self, eradicated: bool) -> DominantSubtype {
        if eradicated {
            return DominantSubtype::None;
        }
        self.trace
            .last()
            .and_then(|s| s.populations.dominant_tumor_subtype())
            .into()
    }
}

/// Monotone cells-to-volume transform (mm³)
pub fn tumor_volume_mm3(tumor_cells: f64) -> f64 {
    tumor_cells.max(0.0) * CELLS_TO_MM3
}

/// Bounded monotone transform from survival probability to months
pub fn median_survival_months(probability: f64) -> f64 {
    MEDIAN_SURVIVAL_CEILING_MONTHS * probability / (probability + 0.5)
}

/// Mean net immune activation over the recorded trajectory.
///
/// Replays the immune model over the recorded populations; deterministic
/// because activation depends only on burden history and patient factors.
pub fn mean_immune_activation(trace: &SimulationTrace, params: &SimulationParameters) -> f64 {
    if trace.is_empty() {
        return 0.0;
    }
    let mut immune = ImmuneSystem::new(
        params.patient().immune_competence(),
        params.treatment_protocol,
        params.immune_cells,
    );
    let sum: f64 = trace
        .iter()
        .map(|s| {
            immune
                .step(s.populations.immune, s.populations.tumor_burden())
                .activation
        })
        .sum();
    sum / trace.len() as f64
}

/// Side-effect bucket from the toxicity index
pub fn side_effect_category(toxicity_index: f64) -> SideEffectSeverity {
    if toxicity_index < TOXICITY_MODERATE_THRESHOLD {
        SideEffectSeverity::Mild
    } else if toxicity_index < TOXICITY_SEVERE_THRESHOLD {
        SideEffectSeverity::Moderate
    } else if toxicity_index < TOXICITY_CRITICAL_THRESHOLD {
        SideEffectSeverity::Severe
    } else {
        SideEffectSeverity::LifeThreatening
    }
}

/// Quality-of-life bucket from survival probability and toxicity burden
pub fn quality_of_life_category(survival: f64, toxicity_index: f64) -> QualityOfLife {
    let comfort = (1.0 - toxicity_index / 2.0).clamp(0.0, 1.0);
    let score = 0.6 * survival + 0.4 * comfort;
    if score >= 0.75 {
        QualityOfLife::Good
    } else if score >= 0.5 {
        QualityOfLife::Fair
    } else if score >= 0.25 {
        QualityOfLife::Poor
    } else {
        QualityOfLife::VeryPoor
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
