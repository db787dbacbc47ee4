//! # Gauss–Seidel Power Flow
//!
//! Solves for the PQ-bus voltages of a network with one fixed reference bus
//! by fixed-point iteration on the nodal current balance.
//!
//! ## Update Rule
//!
//! For each PQ bus `i = 1..N`, in ascending order:
//!
//! ```text
//! sum_YV(i) = Σ_{j≠i} Y[i][j] · V[j]
//! V[i]     ← ( conj(S[i]) / conj(V[i]) − sum_YV(i) ) / Y[i][i]
//! ```
//!
//! Voltages are updated in place, so buses later in the same pass already see
//! the new values of buses processed before them. Bus 0 is never recomputed.
//!
//! ## Termination
//!
//! After every full pass the new voltage vector is compared with the vector
//! from the start of the pass (see [`ConvergenceCriterion`]). Meeting the test
//! ends the solve with [`Convergence::Converged`] and the 1-based pass count.
//! Exhausting `max_iterations` is a normal outcome, reported as
//! [`Convergence::NotConverged`] together with the last estimate. A pass that
//! produces a non-finite voltage also ends the solve as not converged.
//!
//! ## References
//!
//! - Glover, Sarma & Overbye, "Power System Analysis and Design", §6.5
//! - Stott (1974): "Review of Load-Flow Calculation Methods",
//!   Proceedings of the IEEE, 62(7), 916-929.

use dnet_core::{
    check_dimensions, AdmittanceMatrix, Complex64, DnetError, DnetResult, LoadVector,
    NetworkCase, VoltageState, REFERENCE_BUS,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use web_time::Instant;

/// Default convergence tolerance on voltage change (pu).
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default cap on Gauss–Seidel passes.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Test applied between consecutive passes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConvergenceCriterion {
    /// `max_i |V_new[i] − V_old[i]| < tolerance`
    #[default]
    MaxAbs,
    /// `|V_old[i] − V_new[i]| <= tolerance + rtol · |V_new[i]|` for every bus,
    /// the elementwise closeness test used by array libraries.
    AllClose { rtol: f64 },
}

impl ConvergenceCriterion {
    /// Relative tolerance used by array-library closeness checks.
    pub const DEFAULT_RTOL: f64 = 1e-5;

    /// [`ConvergenceCriterion::AllClose`] with [`Self::DEFAULT_RTOL`].
    pub fn all_close() -> Self {
        ConvergenceCriterion::AllClose {
            rtol: Self::DEFAULT_RTOL,
        }
    }

    fn is_met(&self, previous: &VoltageState, current: &VoltageState, tolerance: f64) -> bool {
        match *self {
            ConvergenceCriterion::MaxAbs => current.max_abs_diff(previous) < tolerance,
            ConvergenceCriterion::AllClose { rtol } => previous
                .as_slice()
                .iter()
                .zip(current.as_slice())
                .all(|(old, new)| (old - new).norm() <= tolerance + rtol * new.norm()),
        }
    }
}

/// Terminal status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Convergence {
    /// The criterion was met after `iterations` passes (1-based).
    Converged { iterations: usize },
    /// The pass budget ran out, or a pass produced a non-finite voltage.
    NotConverged,
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    /// Pass count at convergence, `None` when the solve did not converge.
    pub fn iterations(&self) -> Option<usize> {
        match *self {
            Convergence::Converged { iterations } => Some(iterations),
            Convergence::NotConverged => None,
        }
    }
}

/// Outcome of a Gauss–Seidel solve.
#[derive(Debug, Clone, Serialize)]
pub struct ConvergenceResult {
    /// Final voltage estimate. Bus 0 equals the initial reference voltage.
    pub voltages: VoltageState,
    pub convergence: Convergence,
    /// Passes actually performed, whether or not the solve converged.
    pub iterations_run: usize,
    /// Largest voltage change in the last pass (pu).
    pub max_delta: f64,
    /// Voltage vector after every pass, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<VoltageState>>,
    /// Wall-clock time spent iterating
    pub solve_time_ms: f64,
}

impl ConvergenceResult {
    pub fn converged(&self) -> bool {
        self.convergence.is_converged()
    }
}

/// Gauss–Seidel power-flow solver configuration
#[derive(Debug, Clone)]
pub struct GaussSeidelSolver {
    /// Convergence tolerance on voltage change (pu)
    pub tolerance: f64,
    /// Maximum number of passes
    pub max_iterations: usize,
    pub criterion: ConvergenceCriterion,
    /// Keep a copy of the voltage vector after every pass
    pub record_history: bool,
}

impl Default for GaussSeidelSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussSeidelSolver {
    /// Create a solver with default settings (tol = 1e-6, 1000 passes, max-abs test)
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            criterion: ConvergenceCriterion::MaxAbs,
            record_history: false,
        }
    }

    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Set the convergence test
    pub fn with_criterion(mut self, criterion: ConvergenceCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Record the voltage vector after every pass
    pub fn with_history(mut self, enable: bool) -> Self {
        self.record_history = enable;
        self
    }

    /// Solve a prepared [`NetworkCase`].
    pub fn solve_case(&self, case: &NetworkCase) -> DnetResult<ConvergenceResult> {
        self.solve(&case.ybus, &case.loads, &case.initial_voltages)
    }

    /// Solve several independent cases. Results are in input order; a failing
    /// case does not affect the others.
    pub fn solve_batch(&self, cases: &[NetworkCase]) -> Vec<DnetResult<ConvergenceResult>> {
        #[cfg(feature = "parallel")]
        let results = cases.par_iter().map(|case| self.solve_case(case)).collect();
        #[cfg(not(feature = "parallel"))]
        let results = cases.iter().map(|case| self.solve_case(case)).collect();
        results
    }

    /// Run Gauss–Seidel from `initial` until convergence or the pass cap.
    ///
    /// `loads` must already be on the per-unit base of `ybus`.
    ///
    /// # Errors
    ///
    /// - [`DnetError::InvalidArgument`] for mismatched dimensions, fewer than
    ///   two buses, a non-positive tolerance, a zero pass cap, non-finite
    ///   inputs, or a zero initial voltage on a PQ bus.
    /// - [`DnetError::DegenerateNetwork`] for a zero self-admittance on a PQ
    ///   bus.
    ///
    /// All checks run before any arithmetic.
    pub fn solve(
        &self,
        ybus: &AdmittanceMatrix,
        loads: &LoadVector,
        initial: &VoltageState,
    ) -> DnetResult<ConvergenceResult> {
        self.validate(ybus, loads, initial)?;

        let start = Instant::now();
        let n = ybus.dim();
        let mut voltages = initial.clone();
        let mut previous = initial.clone();
        let mut history = self.record_history.then(Vec::new);
        let mut max_delta = f64::INFINITY;

        for iteration in 1..=self.max_iterations {
            previous
                .as_mut_slice()
                .copy_from_slice(voltages.as_slice());

            let v = voltages.as_mut_slice();
            for i in (REFERENCE_BUS + 1)..n {
                let sum_yv: Complex64 = ybus
                    .row(i)
                    .iter()
                    .zip(v.iter())
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, (y, vj))| y * vj)
                    .sum();
                let s = loads.get(i);
                v[i] = (s.conj() / v[i].conj() - sum_yv) / ybus.diagonal(i);
            }

            max_delta = voltages.max_abs_diff(&previous);
            if let Some(history) = history.as_mut() {
                history.push(voltages.clone());
            }
            debug!(iteration, max_delta, "gauss-seidel pass");

            if !voltages.as_slice().iter().all(|v| v.is_finite()) {
                warn!(iteration, "gauss-seidel produced a non-finite voltage, stopping");
                return Ok(self.finish(
                    voltages,
                    Convergence::NotConverged,
                    iteration,
                    f64::NAN,
                    history,
                    start,
                ));
            }

            if self.criterion.is_met(&previous, &voltages, self.tolerance) {
                info!(iterations = iteration, max_delta, "gauss-seidel converged");
                return Ok(self.finish(
                    voltages,
                    Convergence::Converged {
                        iterations: iteration,
                    },
                    iteration,
                    max_delta,
                    history,
                    start,
                ));
            }
        }

        warn!(
            max_iterations = self.max_iterations,
            max_delta, "gauss-seidel did not converge"
        );
        Ok(self.finish(
            voltages,
            Convergence::NotConverged,
            self.max_iterations,
            max_delta,
            history,
            start,
        ))
    }

    fn finish(
        &self,
        voltages: VoltageState,
        convergence: Convergence,
        iterations_run: usize,
        max_delta: f64,
        history: Option<Vec<VoltageState>>,
        start: Instant,
    ) -> ConvergenceResult {
        ConvergenceResult {
            voltages,
            convergence,
            iterations_run,
            max_delta,
            history,
            solve_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }

    fn validate(
        &self,
        ybus: &AdmittanceMatrix,
        loads: &LoadVector,
        initial: &VoltageState,
    ) -> DnetResult<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(DnetError::invalid(format!(
                "tolerance must be finite and positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(DnetError::invalid("max_iterations must be at least 1"));
        }
        if let ConvergenceCriterion::AllClose { rtol } = self.criterion {
            if !rtol.is_finite() || rtol < 0.0 {
                return Err(DnetError::invalid(format!(
                    "relative tolerance must be finite and non-negative, got {rtol}"
                )));
            }
        }

        check_dimensions(ybus, loads, initial)?;

        let n = ybus.dim();
        for i in 0..n {
            if !ybus.row(i).iter().all(|y| y.is_finite()) {
                return Err(DnetError::invalid(format!(
                    "admittance matrix row {i} has a non-finite entry"
                )));
            }
        }
        if let Some(bus) = loads.as_slice().iter().position(|s| !s.is_finite()) {
            return Err(DnetError::invalid(format!("load at bus {bus} is not finite")));
        }
        if let Some(bus) = initial.as_slice().iter().position(|v| !v.is_finite()) {
            return Err(DnetError::invalid(format!(
                "initial voltage at bus {bus} is not finite"
            )));
        }

        for i in (REFERENCE_BUS + 1)..n {
            if ybus.diagonal(i) == Complex64::new(0.0, 0.0) {
                return Err(DnetError::DegenerateNetwork { bus: i });
            }
            if initial.get(i) == Complex64::new(0.0, 0.0) {
                return Err(DnetError::invalid(format!(
                    "initial voltage at PQ bus {i} is zero"
                )));
            }
        }

        Ok(())
    }
}

/// Solve with explicit tolerance and pass cap and default everything else.
///
/// Shorthand for a [`GaussSeidelSolver`] built with `with_tolerance` and
/// `with_max_iterations`.
pub fn gauss_seidel(
    ybus: &AdmittanceMatrix,
    loads: &LoadVector,
    initial: &VoltageState,
    tolerance: f64,
    max_iterations: usize,
) -> DnetResult<ConvergenceResult> {
    GaussSeidelSolver::new()
        .with_tolerance(tolerance)
        .with_max_iterations(max_iterations)
        .solve(ybus, loads, initial)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_all_close_is_looser_than_max_abs() {
        let old = VoltageState::new(vec![c(1.0, 0.0), c(1.0, 0.0)]);
        let new = VoltageState::new(vec![c(1.0, 0.0), c(1.000_005, 0.0)]);

        assert!(!ConvergenceCriterion::MaxAbs.is_met(&old, &new, 1e-6));
        assert!(ConvergenceCriterion::all_close().is_met(&old, &new, 1e-6));
    }

    #[test]
    fn test_convergence_accessors() {
        let done = Convergence::Converged { iterations: 4 };
        assert!(done.is_converged());
        assert_eq!(done.iterations(), Some(4));
        assert!(!Convergence::NotConverged.is_converged());
        assert_eq!(Convergence::NotConverged.iterations(), None);
    }

    #[test]
    fn test_rejects_bad_solver_settings() {
        let y = AdmittanceMatrix::from_rows(vec![
            vec![c(10.0, -5.0), c(-5.0, 2.0)],
            vec![c(-5.0, 2.0), c(8.0, -3.0)],
        ])
        .unwrap();
        let loads = LoadVector::from_per_unit(vec![c(0.0, 0.0), c(0.2, 0.1)]);
        let v0 = VoltageState::flat(2);

        for solver in [
            GaussSeidelSolver::new().with_tolerance(0.0),
            GaussSeidelSolver::new().with_tolerance(-1e-6),
            GaussSeidelSolver::new().with_tolerance(f64::NAN),
            GaussSeidelSolver::new().with_max_iterations(0),
            GaussSeidelSolver::new().with_criterion(ConvergenceCriterion::AllClose { rtol: -1.0 }),
        ] {
            assert!(matches!(
                solver.solve(&y, &loads, &v0),
                Err(DnetError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_zero_initial_voltage_on_pq_bus_rejected() {
        let y = AdmittanceMatrix::from_rows(vec![
            vec![c(10.0, -5.0), c(-5.0, 2.0)],
            vec![c(-5.0, 2.0), c(8.0, -3.0)],
        ])
        .unwrap();
        let loads = LoadVector::from_per_unit(vec![c(0.0, 0.0), c(0.2, 0.1)]);
        let v0 = VoltageState::new(vec![c(1.0, 0.0), c(0.0, 0.0)]);
        assert!(matches!(
            GaussSeidelSolver::new().solve(&y, &loads, &v0),
            Err(DnetError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_criterion_serde_tags() {
        let json = serde_json::to_string(&ConvergenceCriterion::all_close()).unwrap();
        assert!(json.contains(r#""kind":"all_close""#), "{json}");
        let back: ConvergenceCriterion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ConvergenceCriterion::all_close());

        let parsed: ConvergenceCriterion = serde_json::from_str(r#"{"kind":"max_abs"}"#).unwrap();
        assert_eq!(parsed, ConvergenceCriterion::MaxAbs);
    }
}
