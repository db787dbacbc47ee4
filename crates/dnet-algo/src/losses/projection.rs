//! Geometric loss-reduction projection.
//!
//! Starting from the present loss, every following period is the previous
//! one multiplied by a constant decay factor. The projection is illustrative:
//! the decay is an assumption supplied by the caller, not derived from the
//! network model.
//!
//! ```
//! use dnet_algo::losses::project;
//!
//! let projection = project(1000.0, 2000.0, 3, 0.85)?;
//! assert_eq!(projection.len(), 3);
//! assert!((projection.percentages()[1] - 42.5).abs() < 1e-9);
//! # Ok::<(), dnet_core::DnetError>(())
//! ```

use dnet_core::{DnetError, DnetResult, KilowattHours, LossRecord};
use serde::Serialize;
use tracing::debug;

/// Per-period multiplier observed in regional loss-reduction plans (15% per
/// period).
pub const DEFAULT_DECAY_FACTOR: f64 = 0.85;

/// Projection horizon observed in regional plans (one year of months).
pub const DEFAULT_PERIODS: usize = 12;

/// One projected period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedLoss {
    /// 0-based period index; period 0 is the present.
    pub period: usize,
    #[serde(rename = "loss_kwh")]
    pub loss: KilowattHours,
    pub percent_of_initial: f64,
}

/// Chronological series of projected losses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossProjection {
    #[serde(rename = "initial_kwh")]
    pub initial: KilowattHours,
    pub decay_factor: f64,
    pub entries: Vec<ProjectedLoss>,
}

impl LossProjection {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Projected losses in kWh, in period order.
    pub fn losses(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.loss.value()).collect()
    }

    /// Projected losses as percentages of the initial loss, in period order.
    pub fn percentages(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.percent_of_initial).collect()
    }

    /// Pair caller-supplied labels (e.g. calendar months) with the entries.
    ///
    /// The label count must match the number of periods.
    pub fn labeled<'a, L: AsRef<str>>(
        &'a self,
        labels: &'a [L],
    ) -> DnetResult<Vec<(&'a str, &'a ProjectedLoss)>> {
        if labels.len() != self.entries.len() {
            return Err(DnetError::invalid(format!(
                "{} labels supplied for {} projected periods",
                labels.len(),
                self.entries.len()
            )));
        }
        Ok(labels
            .iter()
            .map(|label| label.as_ref())
            .zip(self.entries.iter())
            .collect())
    }
}

/// Project `periods` values of loss under a constant per-period decay.
///
/// Period 0 is `current_loss`; period k is period k−1 times `decay_factor`.
/// Each entry also carries `loss / initial_loss * 100`.
///
/// # Errors
///
/// [`DnetError::InvalidArgument`] when `initial_loss` is not positive,
/// `current_loss` is negative, `periods` is zero, `decay_factor` is not
/// positive, or any input is non-finite.
pub fn project(
    current_loss: f64,
    initial_loss: f64,
    periods: usize,
    decay_factor: f64,
) -> DnetResult<LossProjection> {
    if !initial_loss.is_finite() || initial_loss <= 0.0 {
        return Err(DnetError::invalid(format!(
            "initial loss must be finite and positive, got {initial_loss}"
        )));
    }
    if !current_loss.is_finite() || current_loss < 0.0 {
        return Err(DnetError::invalid(format!(
            "current loss must be finite and non-negative, got {current_loss}"
        )));
    }
    if periods == 0 {
        return Err(DnetError::invalid("projection needs at least 1 period"));
    }
    if !decay_factor.is_finite() || decay_factor <= 0.0 {
        return Err(DnetError::invalid(format!(
            "decay factor must be finite and positive, got {decay_factor}"
        )));
    }
    if decay_factor >= 1.0 {
        debug!(decay_factor, "decay factor does not reduce losses");
    }

    let mut entries = Vec::with_capacity(periods);
    let mut loss = current_loss;
    for period in 0..periods {
        if period > 0 {
            loss *= decay_factor;
        }
        entries.push(ProjectedLoss {
            period,
            loss: KilowattHours(loss),
            percent_of_initial: loss / initial_loss * 100.0,
        });
    }

    debug!(periods, decay_factor, final_loss = loss, "loss projection generated");

    Ok(LossProjection {
        initial: KilowattHours(initial_loss),
        decay_factor,
        entries,
    })
}

/// Projection settings, applied to a [`LossRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossProjector {
    pub periods: usize,
    pub decay_factor: f64,
}

impl Default for LossProjector {
    fn default() -> Self {
        Self::new()
    }
}

impl LossProjector {
    /// Twelve periods at 0.85 per period.
    pub fn new() -> Self {
        Self {
            periods: DEFAULT_PERIODS,
            decay_factor: DEFAULT_DECAY_FACTOR,
        }
    }

    pub fn with_periods(mut self, periods: usize) -> Self {
        self.periods = periods;
        self
    }

    pub fn with_decay_factor(mut self, decay_factor: f64) -> Self {
        self.decay_factor = decay_factor;
        self
    }

    /// Project from `record.current`, quoting percentages against `record.initial`.
    pub fn project(&self, record: &LossRecord) -> DnetResult<LossProjection> {
        project(
            record.current.value(),
            record.initial.value(),
            self.periods,
            self.decay_factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_requires_matching_count() {
        let projection = project(100.0, 100.0, 2, 0.5).unwrap();
        assert!(projection.labeled(&["May 24"]).is_err());

        let labeled = projection.labeled(&["May 24", "June 24"]).unwrap();
        assert_eq!(labeled[1].0, "June 24");
        assert_eq!(labeled[1].1.loss.value(), 50.0);
    }

    #[test]
    fn test_projector_defaults() {
        let projector = LossProjector::default();
        assert_eq!(projector.periods, 12);
        assert_eq!(projector.decay_factor, 0.85);
    }

    #[test]
    fn test_projector_uses_record() {
        let record = LossRecord::new(2000.0, 1000.0).unwrap();
        let projection = LossProjector::new().with_periods(2).project(&record).unwrap();
        assert_eq!(projection.losses(), vec![1000.0, 850.0]);
        assert_eq!(projection.initial.value(), 2000.0);
    }
}
