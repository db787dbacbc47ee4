//! Advisory diagnostics for network inputs.
//!
//! Hard precondition failures are returned as [`crate::DnetError`]. Everything
//! here is softer: conditions under which a solve is still attempted but the
//! caller may want to know, such as an admittance matrix that is not
//! diagonally dominant (Gauss–Seidel convergence is then not guaranteed).
//!
//! # Example
//!
//! ```
//! use dnet_core::diagnostics::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning_with_entity("convergence", "row is not diagonally dominant", "Bus 2");
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert!(!diag.has_errors());
//! ```

use serde::Serialize;

use crate::network::AdmittanceMatrix;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but operation continued
    Warning,
    /// Could not complete element/operation
    Error,
}

/// A single diagnostic issue
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping (e.g., "symmetry", "convergence")
    pub category: String,
    pub message: String,
    /// Optional entity reference (e.g., "Bus 1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues for an operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn issues_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    pub fn summary(&self) -> String {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        match (self.warning_count(), self.error_count()) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => format!("{} warning{}", w, plural(w)),
            (0, e) => format!("{} error{}", e, plural(e)),
            (w, e) => format!("{} warning{}, {} error{}", w, plural(w), e, plural(e)),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

/// Symmetry tolerance used by [`inspect_admittance`].
const SYMMETRY_TOL: f64 = 1e-9;

/// Inspect an admittance matrix for conditions that do not block a solve.
///
/// - `error` / `degenerate`: zero self-admittance on a PQ bus (the solver will
///   refuse the case).
/// - `warning` / `symmetry`: `Y[i][j] != Y[j][i]`.
/// - `warning` / `convergence`: PQ row where `|Y[i][i]| <= Σ_{j≠i} |Y[i][j]|`.
pub fn inspect_admittance(ybus: &AdmittanceMatrix) -> Diagnostics {
    let mut diag = Diagnostics::new();
    let n = ybus.dim();

    if !ybus.is_symmetric(SYMMETRY_TOL) {
        diag.add_warning("symmetry", "admittance matrix is not symmetric");
    }

    for i in 1..n {
        let entity = format!("Bus {i}");
        let diagonal = ybus.diagonal(i).norm();
        if diagonal == 0.0 {
            diag.add_error_with_entity("degenerate", "zero self-admittance", &entity);
            continue;
        }
        let off_diagonal: f64 = ybus
            .row(i)
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, y)| y.norm())
            .sum();
        if diagonal <= off_diagonal {
            diag.add_warning_with_entity(
                "convergence",
                &format!(
                    "row is not diagonally dominant (|Yii| = {diagonal:.4}, sum |Yij| = {off_diagonal:.4})"
                ),
                &entity,
            );
        }
    }

    diag
}
