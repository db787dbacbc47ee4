//! Unit newtypes for the quantities that cross the input boundary.
//!
//! Regional datasets quote loads in kW / kVAR and losses in kWh, while the
//! admittance matrix lives on a per-unit base. Keeping these as distinct
//! types makes the conversion between them explicit: the only way from
//! [`Kilowatts`] to a per-unit load is through a [`LoadScaling`].
//!
//! # Usage
//!
//! ```
//! use dnet_core::units::{Kilovars, Kilowatts, LoadScaling};
//!
//! let scaling = LoadScaling::KW_TO_MW;
//! let s = scaling.to_per_unit(Kilowatts(200.0), Kilovars(100.0));
//! assert!((s.re - 0.2).abs() < 1e-12);
//! assert!((s.im - 0.1).abs() < 1e-12);
//! ```

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::{DnetError, DnetResult};

/// Implements arithmetic and helpers shared by every unit newtype.
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Check if value is finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

// =============================================================================
// Power and Energy Units
// =============================================================================

/// Active power in kilowatts (kW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilowatts(pub f64);

impl_unit_ops!(Kilowatts, "kW");

/// Reactive power in kilovolt-amperes reactive (kVAR)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilovars(pub f64);

impl_unit_ops!(Kilovars, "kVAR");

/// Energy in kilowatt-hours (kWh), used for network losses
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KilowattHours(pub f64);

impl_unit_ops!(KilowattHours, "kWh");

impl KilowattHours {
    /// Convert to megawatt-hours
    #[inline]
    pub fn to_megawatt_hours(self) -> f64 {
        self.0 / 1000.0
    }
}

// =============================================================================
// Voltage and Angle Units
// =============================================================================

/// Voltage magnitude in per-unit (pu)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PerUnit(pub f64);

impl_unit_ops!(PerUnit, "pu");

impl PerUnit {
    /// One per-unit (nominal voltage)
    pub const ONE: Self = Self(1.0);
}

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Radians, "rad");

/// Angle in degrees, the display unit for voltage angles
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees, "°");

impl Radians {
    /// Convert to degrees
    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }
}

impl Degrees {
    /// Convert to radians
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }
}

// =============================================================================
// Load Scaling
// =============================================================================

/// Conversion from engineering load units (kW / kVAR) to the per-unit base of
/// the admittance matrix.
///
/// The per-unit load is `(P + jQ) / kw_per_unit`. Regional datasets quote
/// loads in kW and pair them with admittances on a MW base, so the usual
/// divisor is 1000 ([`LoadScaling::KW_TO_MW`]). Data that is already on the
/// admittance base uses [`LoadScaling::IDENTITY`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadScaling {
    /// Number of kW (or kVAR) in one per-unit of load.
    pub kw_per_unit: f64,
}

impl Default for LoadScaling {
    fn default() -> Self {
        Self::KW_TO_MW
    }
}

impl LoadScaling {
    /// kW / kVAR quoted against a MW / MVAR admittance base.
    pub const KW_TO_MW: Self = Self {
        kw_per_unit: 1000.0,
    };

    /// Loads already expressed on the admittance base.
    pub const IDENTITY: Self = Self { kw_per_unit: 1.0 };

    /// Build a scaling with a custom divisor.
    ///
    /// The divisor must be finite and strictly positive.
    pub fn new(kw_per_unit: f64) -> DnetResult<Self> {
        if !kw_per_unit.is_finite() || kw_per_unit <= 0.0 {
            return Err(DnetError::invalid(format!(
                "load scaling divisor must be finite and positive, got {kw_per_unit}"
            )));
        }
        Ok(Self { kw_per_unit })
    }

    /// Convert one bus load to a per-unit complex power `P + jQ`.
    #[inline]
    pub fn to_per_unit(self, p: Kilowatts, q: Kilovars) -> Complex64 {
        Complex64::new(p.0 / self.kw_per_unit, q.0 / self.kw_per_unit)
    }
}
