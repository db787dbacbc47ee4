//! Side-by-side view of initial, current and estimated post-optimization loss.
//!
//! The post-optimization figure is a caller convention: the present loss
//! divided by a fixed factor. It is not computed from solved voltages, so the
//! divisor is always passed in explicitly and the estimate is omitted when
//! the caller has none.

use dnet_core::{DnetError, DnetResult, KilowattHours, LossRecord};
use serde::Serialize;

/// Divisor used by regional reports for the post-optimization estimate.
pub const OBSERVED_POST_OPTIMIZATION_DIVISOR: f64 = 1.445;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PostOptimizationEstimate {
    pub divisor: f64,
    #[serde(rename = "loss_kwh")]
    pub loss: KilowattHours,
    pub percent_of_initial: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LossComparison {
    #[serde(rename = "initial_kwh")]
    pub initial: KilowattHours,
    #[serde(rename = "current_kwh")]
    pub current: KilowattHours,
    pub percent_of_initial: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_optimization: Option<PostOptimizationEstimate>,
}

/// Compare current against initial loss, optionally adding `current / divisor`
/// as a post-optimization estimate.
pub fn compare_losses(
    record: &LossRecord,
    post_optimization_divisor: Option<f64>,
) -> DnetResult<LossComparison> {
    let percent_of_initial = record.percent_of_initial()?;

    let post_optimization = post_optimization_divisor
        .map(|divisor| {
            if !divisor.is_finite() || divisor <= 0.0 {
                return Err(DnetError::invalid(format!(
                    "post-optimization divisor must be finite and positive, got {divisor}"
                )));
            }
            let loss = record.current / divisor;
            Ok(PostOptimizationEstimate {
                divisor,
                loss,
                percent_of_initial: loss / record.initial * 100.0,
            })
        })
        .transpose()?;

    Ok(LossComparison {
        initial: record.initial,
        current: record.current,
        percent_of_initial,
        post_optimization,
    })
}
