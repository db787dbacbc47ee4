//! Measured network losses for one service area.

use serde::{Deserialize, Serialize};

use crate::error::{DnetError, DnetResult};
use crate::units::KilowattHours;

/// Baseline and present-measured energy losses.
///
/// `initial` is the reference figure that percentages are quoted against;
/// `current` is the figure a projection starts from. The two are independent
/// measurements; only non-negativity is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossRecord {
    #[serde(rename = "initial_kwh")]
    pub initial: KilowattHours,
    #[serde(rename = "current_kwh")]
    pub current: KilowattHours,
}

impl LossRecord {
    pub fn new(initial_kwh: f64, current_kwh: f64) -> DnetResult<Self> {
        for (label, value) in [("initial", initial_kwh), ("current", current_kwh)] {
            if !value.is_finite() || value < 0.0 {
                return Err(DnetError::invalid(format!(
                    "{label} loss must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(Self {
            initial: KilowattHours(initial_kwh),
            current: KilowattHours(current_kwh),
        })
    }

    /// Current loss as a percentage of the initial loss.
    ///
    /// Fails when the initial loss is zero, since it is the denominator.
    pub fn percent_of_initial(&self) -> DnetResult<f64> {
        if self.initial.value() <= 0.0 {
            return Err(DnetError::invalid(
                "initial loss must be positive to express a percentage",
            ));
        }
        Ok(self.current / self.initial * 100.0)
    }
}
