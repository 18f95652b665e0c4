//! Fixed-size population vector over the four cell subtypes.
//!
//! The simulation tracks exactly four compartments: drug-sensitive tumor
//! cells, drug-resistant tumor cells, stem-like tumor cells, and immune
//! effector cells. A fixed struct with named accessors avoids any heap
//! indirection in the per-day update loop.

use serde::{Deserialize, Serialize};

/// Number of simulated subtypes (three tumor compartments plus immune)
pub const SUBTYPE_COUNT: usize = 4;

/// Number of tumor subtypes (excludes immune effector cells)
pub const TUMOR_SUBTYPE_COUNT: usize = 3;

/// One of the three tumor cell compartments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TumorSubtype {
    /// Drug-sensitive tumor cells
    Sensitive,
    /// Drug-resistant tumor cells
    Resistant,
    /// Stem-like tumor cells
    Stem,
}

impl TumorSubtype {
    /// All tumor subtypes in canonical order (matches payoff-matrix rows)
    pub const ALL: [TumorSubtype; TUMOR_SUBTYPE_COUNT] = [
        TumorSubtype::Sensitive,
        TumorSubtype::Resistant,
        TumorSubtype::Stem,
    ];

    /// Row/column index in the payoff matrix
    pub fn index(&self) -> usize {
        match self {
            TumorSubtype::Sensitive => 0,
            TumorSubtype::Resistant => 1,
            TumorSubtype::Stem => 2,
        }
    }

    /// Display label used in summaries and exports
    pub fn label(&self) -> &'static str {
        match self {
            TumorSubtype::Sensitive => "sensitive",
            TumorSubtype::Resistant => "resistant",
            TumorSubtype::Stem => "stemcell",
        }
    }
}

/// Population counts for all four subtypes at one instant.
///
/// Counts are continuous (fractional cells are meaningful in the
/// compartmental approximation) and never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubtypeVector {
    /// Drug-sensitive tumor cell count
    pub sensitive: f64,
    /// Drug-resistant tumor cell count
    pub resistant: f64,
    /// Stem-like tumor cell count
    pub stem: f64,
    /// Immune effector cell count
    pub immune: f64,
}

impl SubtypeVector {
    /// Create a population vector from the four counts
    pub fn new(sensitive: f64, resistant: f64, stem: f64, immune: f64) -> Self {
        Self {
            sensitive,
            resistant,
            stem,
            immune,
        }
    }

    /// The empty population
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Total tumor burden (sensitive + resistant + stem, excludes immune)
    pub fn tumor_burden(&self) -> f64 {
        self.sensitive + self.resistant + self.stem
    }

    /// Total population across all four subtypes
    pub fn total(&self) -> f64 {
        self.tumor_burden() + self.immune
    }

    /// Counts in canonical order [sensitive, resistant, stem, immune]
    pub fn as_array(&self) -> [f64; SUBTYPE_COUNT] {
        [self.sensitive, self.resistant, self.stem, self.immune]
    }

    /// Tumor counts in canonical order [sensitive, resistant, stem]
    pub fn tumor_array(&self) -> [f64; TUMOR_SUBTYPE_COUNT] {
        [self.sensitive, self.resistant, self.stem]
    }

    /// Count for one tumor subtype
    pub fn tumor_count(&self, subtype: TumorSubtype) -> f64 {
        match subtype {
            TumorSubtype::Sensitive => self.sensitive,
            TumorSubtype::Resistant => self.resistant,
            TumorSubtype::Stem => self.stem,
        }
    }

    /// Frequency of each subtype in the total population.
    ///
    /// An all-zero population yields all-zero frequencies (the replicator
    /// fitness of an extinct population is defined as zero, so no
    /// divide-by-zero guard is needed downstream).
    pub fn frequencies(&self) -> [f64; SUBTYPE_COUNT] {
        let total = self.total();
        if total <= 0.0 {
            return [0.0; SUBTYPE_COUNT];
        }
        [
            self.sensitive / total,
            self.resistant / total,
            self.stem / total,
            self.immune / total,
        ]
    }

    /// Largest tumor compartment, or `None` when the burden is zero
    pub fn dominant_tumor_subtype(&self) -> Option<TumorSubtype> {
        if self.tumor_burden() <= 0.0 {
            return None;
        }
        let mut best = TumorSubtype::Sensitive;
        for subtype in [TumorSubtype::Resistant, TumorSubtype::Stem] {
            if self.tumor_count(subtype) > self.tumor_count(best) {
                best = subtype;
            }
        }
        Some(best)
    }

    /// True when every count is a finite real
    pub fn is_finite(&self) -> bool {
        self.sensitive.is_finite()
            && self.resistant.is_finite()
            && self.stem.is_finite()
            && self.immune.is_finite()
    }

    /// True when every count is non-negative
    pub fn is_non_negative(&self) -> bool {
        self.sensitive >= 0.0 && self.resistant >= 0.0 && self.stem >= 0.0 && self.immune >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let pop = SubtypeVector::new(100.0, 10.0, 5.0, 50.0);
        assert_eq!(pop.tumor_burden(), 115.0);
        assert_eq!(pop.total(), 165.0);
    }

    #[test]
    fn test_frequencies_sum_to_one() {
        let pop = SubtypeVector::new(100.0, 10.0, 5.0, 50.0);
        let sum: f64 = pop.frequencies().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_population_frequencies() {
        let pop = SubtypeVector::zero();
        assert_eq!(pop.frequencies(), [0.0; SUBTYPE_COUNT]);
        assert!(pop.dominant_tumor_subtype().is_none());
    }

    #[test]
    fn test_dominant_subtype() {
        let pop = SubtypeVector::new(1.0, 30.0, 5.0, 50.0);
        assert_eq!(pop.dominant_tumor_subtype(), Some(TumorSubtype::Resistant));

        // Ties resolve to the earlier subtype in canonical order
        let tie = SubtypeVector::new(10.0, 10.0, 5.0, 0.0);
        assert_eq!(tie.dominant_tumor_subtype(), Some(TumorSubtype::Sensitive));
    }

    #[test]
    fn test_finiteness_check() {
        let mut pop = SubtypeVector::new(1.0, 2.0, 3.0, 4.0);
        assert!(pop.is_finite());
        pop.stem = f64::NAN;
        assert!(!pop.is_finite());
    }
}
