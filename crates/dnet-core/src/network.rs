//! Network description consumed by the power-flow solver.
//!
//! Bus 0 is always the reference (slack) bus. Every other bus is a PQ bus
//! with a specified complex load. All three containers are plain values:
//! they are built once per solve and never shared between solves.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{DnetError, DnetResult};
use crate::units::{Degrees, Kilovars, Kilowatts, LoadScaling, PerUnit, Radians};

/// Index of the reference (slack) bus.
pub const REFERENCE_BUS: usize = 0;

// ============================================================================
// Admittance Matrix
// ============================================================================

/// Dense N×N bus admittance matrix (Ybus), stored row-major.
///
/// `Y[i][j]` is the mutual admittance between buses i and j, `Y[i][i]` the
/// self-admittance. Symmetry is typical but not enforced; see
/// [`crate::diagnostics::inspect_admittance`] for advisory checks.
///
/// Serializes as a list of rows, each entry a `[re, im]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Complex64>>", into = "Vec<Vec<Complex64>>")]
pub struct AdmittanceMatrix {
    n: usize,
    values: Vec<Complex64>,
}

impl AdmittanceMatrix {
    /// Build from explicit rows. Every row must have exactly as many entries
    /// as there are rows.
    pub fn from_rows(rows: Vec<Vec<Complex64>>) -> DnetResult<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(DnetError::invalid("admittance matrix has no rows"));
        }
        let mut values = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(DnetError::invalid(format!(
                    "admittance matrix row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            values.extend(row);
        }
        Ok(Self { n, values })
    }

    /// Number of buses.
    #[inline]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Entry `Y[i][j]`.
    ///
    /// # Panics
    /// If `i` or `j` is out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Complex64 {
        self.values[i * self.n + j]
    }

    /// Self-admittance `Y[i][i]`.
    #[inline]
    pub fn diagonal(&self, i: usize) -> Complex64 {
        self.get(i, i)
    }

    /// Row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[Complex64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }

    /// True when `|Y[i][j] - Y[j][i]| <= tol` for every pair.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        (0..self.n).all(|i| {
            (i + 1..self.n).all(|j| (self.get(i, j) - self.get(j, i)).norm() <= tol)
        })
    }

    /// Copy out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<Complex64>> {
        self.values.chunks(self.n).map(<[Complex64]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<Complex64>>> for AdmittanceMatrix {
    type Error = DnetError;

    fn try_from(rows: Vec<Vec<Complex64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<AdmittanceMatrix> for Vec<Vec<Complex64>> {
    fn from(matrix: AdmittanceMatrix) -> Self {
        matrix.to_rows()
    }
}

// ============================================================================
// Loads
// ============================================================================

/// Per-bus complex loads `S = P + jQ` on the admittance per-unit base.
///
/// Entry 0 belongs to the reference bus and is ignored by the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadVector(Vec<Complex64>);

impl LoadVector {
    /// Wrap loads that are already on the admittance base.
    pub fn from_per_unit(loads: Vec<Complex64>) -> Self {
        Self(loads)
    }

    /// Build from engineering units (kW, kVAR), dividing by the scaling's
    /// `kw_per_unit`.
    pub fn from_kw_kvar(p_kw: &[f64], q_kvar: &[f64], scaling: LoadScaling) -> DnetResult<Self> {
        if p_kw.len() != q_kvar.len() {
            return Err(DnetError::invalid(format!(
                "active load has {} entries but reactive load has {}",
                p_kw.len(),
                q_kvar.len()
            )));
        }
        let loads = p_kw
            .iter()
            .zip(q_kvar)
            .map(|(&p, &q)| scaling.to_per_unit(Kilowatts(p), Kilovars(q)))
            .collect();
        Ok(Self(loads))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Complex64] {
        &self.0
    }

    /// Load at bus `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Complex64 {
        self.0[i]
    }
}

// ============================================================================
// Voltages
// ============================================================================

/// Complex bus voltage phasors in per-unit, one per bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoltageState(Vec<Complex64>);

/// Polar view of one bus voltage, as shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BusPolar {
    pub bus: usize,
    pub magnitude: PerUnit,
    pub angle: Degrees,
}

impl VoltageState {
    pub fn new(voltages: Vec<Complex64>) -> Self {
        Self(voltages)
    }

    /// Flat start: every bus at 1.0∠0° pu.
    pub fn flat(n: usize) -> Self {
        Self(vec![Complex64::new(1.0, 0.0); n])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Complex64] {
        &self.0
    }

    /// Mutable access for in-place iteration.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Complex64] {
        &mut self.0
    }

    /// Voltage at bus `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Complex64 {
        self.0[i]
    }

    /// Largest elementwise `|a - b|` between two states of equal length.
    pub fn max_abs_diff(&self, other: &VoltageState) -> f64 {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }

    /// Magnitude (pu) and angle (degrees) per bus.
    pub fn polar(&self) -> Vec<BusPolar> {
        self.0
            .iter()
            .enumerate()
            .map(|(bus, v)| BusPolar {
                bus,
                magnitude: PerUnit(v.norm()),
                angle: Radians(v.arg()).to_degrees(),
            })
            .collect()
    }

    pub fn into_inner(self) -> Vec<Complex64> {
        self.0
    }
}

// ============================================================================
// Network Case
// ============================================================================

/// Check that matrix and vectors agree on the bus count and that there is at
/// least one PQ bus besides the reference.
pub fn check_dimensions(
    ybus: &AdmittanceMatrix,
    loads: &LoadVector,
    voltages: &VoltageState,
) -> DnetResult<()> {
    let n = ybus.dim();
    if n < 2 {
        return Err(DnetError::invalid(format!(
            "network needs at least 2 buses, admittance matrix is {n}x{n}"
        )));
    }
    if loads.len() != n {
        return Err(DnetError::invalid(format!(
            "load vector has {} entries, expected {n}",
            loads.len()
        )));
    }
    if voltages.len() != n {
        return Err(DnetError::invalid(format!(
            "initial voltage vector has {} entries, expected {n}",
            voltages.len()
        )));
    }
    Ok(())
}

/// A complete, dimension-checked set of solver inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCase {
    pub name: String,
    pub ybus: AdmittanceMatrix,
    pub loads: LoadVector,
    pub initial_voltages: VoltageState,
}

impl NetworkCase {
    pub fn new(
        name: impl Into<String>,
        ybus: AdmittanceMatrix,
        loads: LoadVector,
        initial_voltages: VoltageState,
    ) -> DnetResult<Self> {
        check_dimensions(&ybus, &loads, &initial_voltages)?;
        Ok(Self {
            name: name.into(),
            ybus,
            loads,
            initial_voltages,
        })
    }

    /// Number of buses.
    pub fn bus_count(&self) -> usize {
        self.ybus.dim()
    }
}
