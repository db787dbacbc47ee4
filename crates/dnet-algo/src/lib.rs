//! # dnet-algo: Power Flow and Loss Analysis
//!
//! Numerical core for distribution network studies.
//!
//! ## Power Flow
//!
//! [`GaussSeidelSolver`] computes steady-state bus voltages for a network with
//! one reference bus and PQ buses elsewhere. Non-convergence is an ordinary
//! outcome ([`Convergence::NotConverged`]); only caller configuration errors
//! (dimension mismatches, zero self-admittance) are returned as errors.
//!
//! ## Loss Analysis
//!
//! - [`losses::project`]: geometric loss-reduction trajectory
//! - [`losses::compare_losses`]: initial vs. current loss summary
//!
//! ## Example
//!
//! ```
//! use dnet_algo::{GaussSeidelSolver, LossProjector};
//! use dnet_core::*;
//!
//! let ybus = AdmittanceMatrix::from_rows(vec![
//!     vec![Complex64::new(10.0, -5.0), Complex64::new(-5.0, 2.0)],
//!     vec![Complex64::new(-5.0, 2.0), Complex64::new(8.0, -3.0)],
//! ])?;
//! let loads = LoadVector::from_kw_kvar(&[0.0, 200.0], &[0.0, 100.0], LoadScaling::KW_TO_MW)?;
//! let v0 = VoltageState::new(vec![Complex64::new(1.02, 0.0), Complex64::new(0.97, 0.03)]);
//!
//! let result = GaussSeidelSolver::new().solve(&ybus, &loads, &v0)?;
//! assert!(result.converged());
//!
//! let record = LossRecord::new(229_576_732.0, 21_343_577.0)?;
//! let projection = LossProjector::new().project(&record)?;
//! assert_eq!(projection.len(), 12);
//! # Ok::<(), DnetError>(())
//! ```

pub mod losses;
pub mod power_flow;

pub use losses::{compare_losses, project, LossComparison, LossProjection, LossProjector};
pub use power_flow::*;
