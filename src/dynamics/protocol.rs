//! Treatment protocols and their effect multipliers.
//!
//! A protocol is a dosing schedule policy. Each protocol also carries a
//! fixed table of multipliers that shift the selective landscape: how hard
//! the drug hits each tumor subtype, how much it helps or hinders immune
//! predation, how toxic the exposure is, and how strongly it selects for
//! resistance. The tables are configuration constants keyed by the closed
//! enum so the whole state space is exhaustively testable.
//!
//! References:
//! - Zhang J et al. Nat Commun. 2017;8:1816 (adaptive therapy)
//! - Kerbel RS, Kamen BA. Nat Rev Cancer. 2004;4:423-436 (metronomic dosing)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Dosing schedule policy governing drug concentration over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreatmentProtocol {
    /// Constant steady-state infusion
    #[default]
    Continuous,
    /// High-dose bolus every `dose_frequency` days with exponential washout
    Pulsed,
    /// Frequent low-dose administration (short period, low peak)
    Metronomic,
    /// Burden-gated dosing: doses withheld while the tumor is controlled
    Adaptive,
}

impl TreatmentProtocol {
    /// All protocols, for exhaustive iteration in tests and tables
    pub const ALL: [TreatmentProtocol; 4] = [
        TreatmentProtocol::Continuous,
        TreatmentProtocol::Pulsed,
        TreatmentProtocol::Metronomic,
        TreatmentProtocol::Adaptive,
    ];

    /// Wire-format name (matches the JSON request contract)
    pub fn name(&self) -> &'static str {
        match self {
            TreatmentProtocol::Continuous => "CONTINUOUS",
            TreatmentProtocol::Pulsed => "PULSED",
            TreatmentProtocol::Metronomic => "METRONOMIC",
            TreatmentProtocol::Adaptive => "ADAPTIVE",
        }
    }

    /// Protocol effect multipliers (fixed policy constants)
    ///
    /// PULSED amplifies sensitive-cell kill and toxicity but suppresses
    /// immune predation; METRONOMIC favors immune and stem-cell control at
    /// low toxicity; ADAPTIVE targets resistant cells and minimizes
    /// resistance development.
    pub fn effects(&self) -> ProtocolEffects {
        match self {
            TreatmentProtocol::Continuous => ProtocolEffects {
                sensitive_kill: 1.0,
                resistant_kill: 1.0,
                stem_kill: 1.0,
                immune_multiplier: 1.0,
                toxicity_multiplier: 1.0,
                resistance_development: 1.0,
            },
            TreatmentProtocol::Pulsed => ProtocolEffects {
                sensitive_kill: 1.3,
                resistant_kill: 0.9,
                stem_kill: 1.0,
                immune_multiplier: 0.8,
                toxicity_multiplier: 1.8,
                resistance_development: 1.3,
            },
            TreatmentProtocol::Metronomic => ProtocolEffects {
                sensitive_kill: 0.9,
                resistant_kill: 1.0,
                stem_kill: 1.2,
                immune_multiplier: 1.3,
                toxicity_multiplier: 0.6,
                resistance_development: 0.9,
            },
            TreatmentProtocol::Adaptive => ProtocolEffects {
                sensitive_kill: 1.0,
                resistant_kill: 1.25,
                stem_kill: 1.0,
                immune_multiplier: 1.1,
                toxicity_multiplier: 0.8,
                resistance_development: 0.6,
            },
        }
    }

    /// Expected objective-response range (percent shrinkage) when a
    /// protocol-based estimate is requested instead of the measured value
    pub fn expected_response_range(&self) -> (f64, f64) {
        match self {
            TreatmentProtocol::Continuous => (35.0, 55.0),
            TreatmentProtocol::Pulsed => (40.0, 65.0),
            TreatmentProtocol::Metronomic => (30.0, 50.0),
            TreatmentProtocol::Adaptive => (45.0, 70.0),
        }
    }
}

impl fmt::Display for TreatmentProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TreatmentProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CONTINUOUS" => Ok(TreatmentProtocol::Continuous),
            "PULSED" => Ok(TreatmentProtocol::Pulsed),
            "METRONOMIC" => Ok(TreatmentProtocol::Metronomic),
            "ADAPTIVE" => Ok(TreatmentProtocol::Adaptive),
            other => Err(format!("unknown treatment protocol: {other}")),
        }
    }
}

/// Per-protocol multipliers applied to drug kill, immune predation,
/// toxicity exposure, and treatment-induced resistance selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtocolEffects {
    /// Multiplier on the drug kill term for sensitive cells
    pub sensitive_kill: f64,
    /// Multiplier on the drug kill term for resistant cells
    pub resistant_kill: f64,
    /// Multiplier on the drug kill term for stem-like cells
    pub stem_kill: f64,
    /// Multiplier on immune predation and the immune payoff column
    pub immune_multiplier: f64,
    /// Multiplier on the toxicity-exposure integral
    pub toxicity_multiplier: f64,
    /// Multiplier on the sensitive-to-resistant mutation flux
    pub resistance_development: f64,
}

impl ProtocolEffects {
    /// Kill multiplier for a tumor subtype by payoff-matrix index
    pub fn kill_multiplier(&self, subtype_index: usize) -> f64 {
        match subtype_index {
            0 => self.sensitive_kill,
            1 => self.resistant_kill,
            _ => self.stem_kill,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for protocol in TreatmentProtocol::ALL {
            let json = serde_json::to_string(&protocol).unwrap();
            assert_eq!(json, format!("\"{}\"", protocol.name()));
            let back: TreatmentProtocol = serde_json::from_str(&json).unwrap();
            assert_eq!(back, protocol);
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(
            "pulsed".parse::<TreatmentProtocol>().unwrap(),
            TreatmentProtocol::Pulsed
        );
        assert!("weekly".parse::<TreatmentProtocol>().is_err());
    }

    #[test]
    fn test_pulsed_escalates_toxicity_and_resistance() {
        let continuous = TreatmentProtocol::Continuous.effects();
        let pulsed = TreatmentProtocol::Pulsed.effects();
        assert!(pulsed.toxicity_multiplier > continuous.toxicity_multiplier);
        assert!(pulsed.resistance_development > continuous.resistance_development);
        assert!(pulsed.sensitive_kill > continuous.sensitive_kill);
        assert!(pulsed.immune_multiplier < continuous.immune_multiplier);
    }

    #[test]
    fn test_adaptive_minimizes_resistance_development() {
        let adaptive = TreatmentProtocol::Adaptive.effects();
        for protocol in TreatmentProtocol::ALL {
            assert!(adaptive.resistance_development <= protocol.effects().resistance_development);
        }
    }

    #[test]
    fn test_metronomic_favors_immune_low_toxicity() {
        let metronomic = TreatmentProtocol::Metronomic.effects();
        for protocol in TreatmentProtocol::ALL {
            assert!(metronomic.toxicity_multiplier <= protocol.effects().toxicity_multiplier);
            assert!(metronomic.immune_multiplier >= protocol.effects().immune_multiplier);
        }
    }
}
