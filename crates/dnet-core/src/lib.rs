//! # dnet-core: Distribution Network Data Model
//!
//! Value types shared by the dnet solver and its callers.
//!
//! ## Conventions
//!
//! - Buses are indexed `0..N`. Bus 0 is the reference (slack) bus; every
//!   other bus is a PQ bus with a specified complex load.
//! - Voltages and admittances are complex per-unit values ([`Complex64`]).
//! - Loads enter in per-unit on the admittance base. Data quoted in kW / kVAR
//!   is converted with an explicit [`LoadScaling`].
//!
//! ## Quick Start
//!
//! ```
//! use dnet_core::*;
//!
//! let ybus = AdmittanceMatrix::from_rows(vec![
//!     vec![Complex64::new(10.0, -5.0), Complex64::new(-5.0, 2.0)],
//!     vec![Complex64::new(-5.0, 2.0), Complex64::new(8.0, -3.0)],
//! ])?;
//! let loads = LoadVector::from_kw_kvar(&[0.0, 200.0], &[0.0, 100.0], LoadScaling::KW_TO_MW)?;
//! let v0 = VoltageState::new(vec![Complex64::new(1.02, 0.0), Complex64::new(0.97, 0.03)]);
//!
//! let case = NetworkCase::new("ULP Semarang Timur", ybus, loads, v0)?;
//! assert_eq!(case.bus_count(), 2);
//! # Ok::<(), DnetError>(())
//! ```
//!
//! ## Modules
//!
//! - [`network`] - Admittance matrix, loads, voltages, solver case
//! - [`loss`] - Measured loss figures
//! - [`units`] - Unit newtypes and load scaling
//! - [`diagnostics`] - Advisory checks on network inputs
//! - [`error`] - Unified error type

pub mod diagnostics;
pub mod error;
pub mod loss;
pub mod network;
pub mod units;

pub use diagnostics::{inspect_admittance, DiagnosticIssue, Diagnostics, Severity};
pub use error::{DnetError, DnetResult};
pub use loss::LossRecord;
pub use network::{
    check_dimensions, AdmittanceMatrix, BusPolar, LoadVector, NetworkCase, VoltageState,
    REFERENCE_BUS,
};
pub use num_complex::Complex64;
pub use units::{Degrees, KilowattHours, Kilovars, Kilowatts, LoadScaling, PerUnit, Radians};
