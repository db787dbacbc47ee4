//! Unified error type for the dnet crates.
//!
//! [`DnetError`] covers both the caller-configuration failures of the
//! numerical core (bad dimensions, non-positive parameters, a degenerate
//! admittance matrix) and the I/O and parsing failures of the outer surfaces.
//!
//! Running out of iterations is *not* an error: the power-flow solver reports
//! it through its convergence status together with the best voltage estimate.
//!
//! # Example
//!
//! ```
//! use dnet_core::{DnetError, DnetResult};
//!
//! fn checked_periods(periods: usize) -> DnetResult<usize> {
//!     if periods == 0 {
//!         return Err(DnetError::InvalidArgument("periods must be at least 1".into()));
//!     }
//!     Ok(periods)
//! }
//!
//! assert!(checked_periods(0).is_err());
//! ```

use thiserror::Error;

/// Unified error type for all dnet operations.
#[derive(Error, Debug)]
pub enum DnetError {
    /// A precondition on the inputs was violated (dimensions, ranges, signs).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The admittance matrix has a zero self-admittance on a bus the solver
    /// must divide by.
    #[error("Degenerate network: zero diagonal admittance at bus {bus}")]
    DegenerateNetwork { bus: usize },

    /// I/O errors (configuration files, output files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

impl DnetError {
    /// Shorthand for an [`DnetError::InvalidArgument`] built from anything printable.
    pub fn invalid(msg: impl Into<String>) -> Self {
        DnetError::InvalidArgument(msg.into())
    }
}

/// Convenience type alias for Results using DnetError.
pub type DnetResult<T> = Result<T, DnetError>;

impl From<anyhow::Error> for DnetError {
    fn from(err: anyhow::Error) -> Self {
        DnetError::Other(err.to_string())
    }
}

impl From<String> for DnetError {
    fn from(s: String) -> Self {
        DnetError::Other(s)
    }
}

impl From<&str> for DnetError {
    fn from(s: &str) -> Self {
        DnetError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DnetError::DegenerateNetwork { bus: 3 };
        assert!(err.to_string().contains("Degenerate network"));
        assert!(err.to_string().contains("bus 3"));

        let err = DnetError::invalid("load vector has 3 entries, expected 2");
        assert!(err.to_string().starts_with("Invalid argument"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DnetError = io_err.into();
        assert!(matches!(err, DnetError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> DnetResult<()> {
            Err(DnetError::invalid("test"))
        }

        fn outer() -> DnetResult<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(DnetError::InvalidArgument(_))));
    }
}
