//! Power Flow Solvers
//!
//! - [`gauss_seidel`]: fixed-point iteration over complex bus voltages with
//!   one reference bus and PQ buses elsewhere.
//!
//! The solver never formats or prints its outcome. Callers receive a
//! [`ConvergenceResult`] and decide how to report iteration counts or
//! non-convergence.

pub mod gauss_seidel;

pub use gauss_seidel::{
    gauss_seidel, Convergence, ConvergenceCriterion, ConvergenceResult, GaussSeidelSolver,
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};
