//! Daily drug concentration per treatment protocol.
//!
//! A one-compartment model with first-order elimination: a bolus sets the
//! concentration to its peak and washout follows
//! `C(t) = C0 · exp(-k_e · t)` with elimination constant
//! `k_e = drug_decay · metabolism`. CONTINUOUS approximates a steady-state
//! infusion whose level scales inversely with clearance. ADAPTIVE is the
//! only schedule that reads simulation state: scheduled doses are withheld
//! while the tumor burden stays below half its initial value.
//!
//! Reference: Rowland M, Tozer TN. Clinical Pharmacokinetics and
//! Pharmacodynamics, 4th ed., 2011 (first-order elimination).

use super::protocol::TreatmentProtocol;

/// Fraction of the initial tumor burden below which ADAPTIVE withholds
/// the next scheduled dose
pub const ADAPTIVE_BURDEN_THRESHOLD: f64 = 0.5;

/// METRONOMIC shortens the dosing period by this divisor
pub const METRONOMIC_PERIOD_DIVISOR: f64 = 3.0;

/// METRONOMIC peak scale relative to the PULSED bolus
pub const METRONOMIC_PEAK_SCALE: f64 = 0.7;

/// Per-unit-of-metabolism reduction of the CONTINUOUS steady-state level
const CONTINUOUS_CLEARANCE_SLOPE: f64 = 0.2;

/// Dosing schedule advanced one day at a time.
///
/// Holds the washout state between doses; one instance belongs to exactly
/// one simulation run.
#[derive(Debug, Clone)]
pub struct DoseSchedule {
    protocol: TreatmentProtocol,
    /// Peak concentration of one bolus (drug_strength · dose_intensity,
    /// already scaled for METRONOMIC)
    peak: f64,
    /// Upper clamp for any concentration value
    ceiling: f64,
    /// First-order elimination constant (per day)
    elimination: f64,
    /// Dosing period in whole days (>= 1)
    period_days: u32,
    /// CONTINUOUS steady-state level
    steady_state: f64,
    /// Days since the last administered bolus
    days_since_dose: u32,
    /// Whether any bolus has been administered yet
    dosed: bool,
}

impl DoseSchedule {
    /// Build a schedule from protocol and dosing parameters.
    ///
    /// `drug_decay` must already be validated as positive; `metabolism`
    /// scales clearance (higher metabolism, faster elimination).
    pub fn new(
        protocol: TreatmentProtocol,
        drug_strength: f64,
        drug_decay: f64,
        dose_frequency: f64,
        dose_intensity: f64,
        metabolism: f64,
    ) -> Self {
        let base_peak = drug_strength * dose_intensity;
        let (peak, period) = match protocol {
            TreatmentProtocol::Metronomic => (
                base_peak * METRONOMIC_PEAK_SCALE,
                (dose_frequency / METRONOMIC_PERIOD_DIVISOR).round(),
            ),
            _ => (base_peak, dose_frequency.round()),
        };
        let steady_state =
            base_peak / (1.0 + CONTINUOUS_CLEARANCE_SLOPE * (metabolism - 1.0)).max(0.1);

        Self {
            protocol,
            peak,
            ceiling: dose_intensity.max(0.0),
            elimination: drug_decay * metabolism,
            period_days: (period as u32).max(1),
            steady_state,
            days_since_dose: 0,
            dosed: false,
        }
    }

    /// The dosing period after protocol adjustment, in days
    pub fn period_days(&self) -> u32 {
        self.period_days
    }

    /// Concentration for `day`, advancing the schedule state.
    ///
    /// Must be called once per day in order. `tumor_burden` and
    /// `initial_burden` are only consulted by ADAPTIVE.
    pub fn concentration_for_day(
        &mut self,
        day: u32,
        tumor_burden: f64,
        initial_burden: f64,
    ) -> f64 {
        let concentration = match self.protocol {
            TreatmentProtocol::Continuous => self.steady_state,
            TreatmentProtocol::Pulsed | TreatmentProtocol::Metronomic => {
                if day % self.period_days == 0 {
                    self.administer();
                }
                self.washout()
            }
            TreatmentProtocol::Adaptive => {
                if day % self.period_days == 0 && self.burden_warrants_dose(tumor_burden, initial_burden) {
                    self.administer();
                }
                self.washout()
            }
        };
        self.days_since_dose = self.days_since_dose.saturating_add(1);
        concentration.clamp(0.0, self.ceiling)
    }

    fn administer(&mut self) {
        self.days_since_dose = 0;
        self.dosed = true;
    }

    /// ADAPTIVE dose gate: dose while the burden has not fallen below the
    /// threshold fraction of its initial value
    fn burden_warrants_dose(&self, tumor_burden: f64, initial_burden: f64) -> bool {
        if initial_burden <= 0.0 {
            return false;
        }
        tumor_burden >= ADAPTIVE_BURDEN_THRESHOLD * initial_burden
    }

    /// Exponential washout since the last administered bolus
    fn washout(&self) -> f64 {
        if !self.dosed {
            return 0.0;
        }
        self.peak * (-self.elimination * self.days_since_dose as f64).exp()
    }
}
