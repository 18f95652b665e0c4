//! Engine error taxonomy.
//!
//! Two failure classes exist:
//! - `InvalidParameter`: caller error, detected before any computation.
//! - `NumericalInstability`: the state update produced a non-finite value.
//!   The error carries the day index of the offending update; the partial
//!   trace up to the last valid day remains available on the engine.
//!
//! Verification discrepancies are deliberately NOT errors. They are advisory
//! data in the `VerificationReport` and never abort a run.

use thiserror::Error;

/// Errors surfaced by the simulation engine.
#[derive(Debug, Error)]
pub enum SimError {
    /// A parameter is out of range or structurally invalid. Nothing was
    /// computed.
    #[error("invalid parameter: {message}")]
    InvalidParameter {
        /// Human-readable description naming the offending field
        message: String,
    },

    /// The state update produced NaN or infinity. The run was aborted.
    #[error("numerical instability at day {day}: {detail}")]
    NumericalInstability {
        /// Day index of the offending update (states before it are valid)
        day: u32,
        /// Which quantity went non-finite
        detail: String,
    },
}

impl SimError {
    /// Shorthand for an `InvalidParameter` error
    pub fn invalid(message: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            message: message.into(),
        }
    }

    /// Shorthand for a `NumericalInstability` error
    pub fn unstable(day: u32, detail: impl Into<String>) -> Self {
        SimError::NumericalInstability {
            day,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = SimError::invalid("drug_decay must be > 0");
        assert_eq!(
            e.to_string(),
            "invalid parameter: drug_decay must be > 0"
        );

        let e = SimError::unstable(42, "sensitive count is NaN");
        assert!(e.to_string().contains("day 42"));
    }
}
