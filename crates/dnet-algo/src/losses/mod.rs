//! Loss analysis
//!
//! - [`projection`]: geometric loss-reduction trajectory over a fixed horizon
//! - [`comparison`]: initial vs. current loss, with an optional
//!   post-optimization estimate
//!
//! Both work purely on measured loss figures and are independent of the
//! power-flow solver.

pub mod comparison;
pub mod projection;

pub use comparison::{
    compare_losses, LossComparison, PostOptimizationEstimate, OBSERVED_POST_OPTIMIZATION_DIVISOR,
};
pub use projection::{
    project, LossProjection, LossProjector, ProjectedLoss, DEFAULT_DECAY_FACTOR, DEFAULT_PERIODS,
};
