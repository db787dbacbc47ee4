//! Presentation of solver and projection results.
//!
//! Reports are plain serializable structs so the same value backs both the
//! JSON output and the table renderers below.

use std::io::{self, Write};

use dnet_algo::{Convergence, ConvergenceResult, LossComparison, LossProjection};
use dnet_core::{BusPolar, Diagnostics, DnetResult, VoltageState};
use serde::Serialize;
use tabwriter::TabWriter;

use crate::common::format_thousands;

#[derive(Debug, Clone, Serialize)]
pub struct VoltageReport {
    pub region: String,
    #[serde(flatten)]
    pub convergence: Convergence,
    pub iterations_run: usize,
    pub max_iterations: usize,
    pub max_delta: f64,
    pub solve_time_ms: f64,
    pub buses: Vec<BusPolar>,
    /// Rectangular voltages as `[re, im]` pairs.
    pub voltages: VoltageState,
    /// Bus voltage magnitudes after each pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Vec<f64>>>,
    pub diagnostics: Diagnostics,
}

impl VoltageReport {
    pub fn new(
        region: impl Into<String>,
        result: &ConvergenceResult,
        max_iterations: usize,
        diagnostics: Diagnostics,
    ) -> Self {
        let history = result.history.as_ref().map(|passes| {
            passes
                .iter()
                .map(|state| state.as_slice().iter().map(|v| v.norm()).collect())
                .collect()
        });
        Self {
            region: region.into(),
            convergence: result.convergence,
            iterations_run: result.iterations_run,
            max_iterations,
            max_delta: result.max_delta,
            solve_time_ms: result.solve_time_ms,
            buses: result.voltages.polar(),
            voltages: result.voltages.clone(),
            history,
            diagnostics,
        }
    }

    fn status_line(&self) -> String {
        match self.convergence {
            Convergence::Converged { iterations } => format!(
                "converged in {iterations} iterations (max delta {:.3e} pu, {:.3} ms)",
                self.max_delta, self.solve_time_ms
            ),
            Convergence::NotConverged => format!(
                "did not converge after {} of {} iterations (max delta {:.3e} pu)",
                self.iterations_run, self.max_iterations, self.max_delta
            ),
        }
    }
}

/// Result of one region in a multi-region solve.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Solved(VoltageReport),
    Failed { region: String, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionRow {
    pub label: String,
    pub period: usize,
    pub loss_kwh: f64,
    pub percent_of_initial: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LossReport {
    pub region: String,
    pub comparison: LossComparison,
    pub decay_factor: f64,
    pub projection: Vec<ProjectionRow>,
}

impl LossReport {
    /// Pair each projected period with its calendar label.
    pub fn new<L: AsRef<str>>(
        region: impl Into<String>,
        comparison: LossComparison,
        projection: &LossProjection,
        labels: &[L],
    ) -> DnetResult<Self> {
        let rows = projection
            .labeled(labels)?
            .into_iter()
            .map(|(label, entry)| ProjectionRow {
                label: label.to_string(),
                period: entry.period,
                loss_kwh: entry.loss.value(),
                percent_of_initial: entry.percent_of_initial,
            })
            .collect();
        Ok(Self {
            region: region.into(),
            comparison,
            decay_factor: projection.decay_factor,
            projection: rows,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub power_flow: VoltageReport,
    pub losses: LossReport,
}

pub fn render_voltage_table<W: Write + ?Sized>(
    report: &VoltageReport,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "Region: {}", report.region)?;
    writeln!(out, "Status: {}", report.status_line())?;
    writeln!(out)?;

    {
        let mut tw = TabWriter::new(&mut *out).padding(2);
        writeln!(tw, "BUS\t|V| (pu)\tANGLE (deg)")?;
        for bus in &report.buses {
            writeln!(
                tw,
                "{}\t{:.6}\t{:.4}",
                bus.bus,
                bus.magnitude.value(),
                bus.angle.value()
            )?;
        }
        tw.flush()?;
    }

    if let Some(history) = &report.history {
        writeln!(out)?;
        let mut tw = TabWriter::new(&mut *out).padding(2);
        let header: Vec<String> = (0..report.buses.len()).map(|i| format!("|V{i}|")).collect();
        writeln!(tw, "PASS\t{}", header.join("\t"))?;
        for (pass, magnitudes) in history.iter().enumerate() {
            let cells: Vec<String> = magnitudes.iter().map(|m| format!("{m:.6}")).collect();
            writeln!(tw, "{}\t{}", pass + 1, cells.join("\t"))?;
        }
        tw.flush()?;
    }

    for issue in &report.diagnostics.issues {
        writeln!(out, "{issue}")?;
    }
    Ok(())
}

pub fn render_batch_table<W: Write + ?Sized>(
    entries: &[BatchEntry],
    out: &mut W,
) -> io::Result<()> {
    let mut tw = TabWriter::new(&mut *out).padding(2);
    writeln!(tw, "REGION\tSTATUS\tITERATIONS\tMIN |V| (pu)")?;
    for entry in entries {
        match entry {
            BatchEntry::Solved(report) => {
                let status = match report.convergence {
                    Convergence::Converged { .. } => "converged",
                    Convergence::NotConverged => "not converged",
                };
                let min_magnitude = report
                    .buses
                    .iter()
                    .map(|b| b.magnitude.value())
                    .fold(f64::INFINITY, f64::min);
                writeln!(
                    tw,
                    "{}\t{}\t{}\t{:.6}",
                    report.region, status, report.iterations_run, min_magnitude
                )?;
            }
            BatchEntry::Failed { region, error } => {
                writeln!(tw, "{region}\terror: {error}\t-\t-")?;
            }
        }
    }
    tw.flush()
}

pub fn render_loss_table<W: Write + ?Sized>(
    report: &LossReport,
    out: &mut W,
) -> io::Result<()> {
    let cmp = &report.comparison;
    writeln!(out, "Region: {}", report.region)?;
    writeln!(
        out,
        "Initial loss: {} kWh",
        format_thousands(cmp.initial.value(), 0)
    )?;
    writeln!(
        out,
        "Current loss: {} kWh ({:.2}% of initial)",
        format_thousands(cmp.current.value(), 0),
        cmp.percent_of_initial
    )?;
    if let Some(estimate) = &cmp.post_optimization {
        writeln!(
            out,
            "Post-optimization estimate: {} kWh ({:.2}% of initial, divisor {})",
            format_thousands(estimate.loss.value(), 0),
            estimate.percent_of_initial,
            estimate.divisor
        )?;
    }
    writeln!(out)?;

    let mut tw = TabWriter::new(&mut *out).padding(2);
    writeln!(tw, "MONTH\tLOSS (kWh)\t% OF INITIAL")?;
    for row in &report.projection {
        writeln!(
            tw,
            "{}\t{}\t{:.2}",
            row.label,
            format_thousands(row.loss_kwh, 0),
            row.percent_of_initial
        )?;
    }
    tw.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnet_algo::{compare_losses, project, GaussSeidelSolver};
    use dnet_core::{AdmittanceMatrix, Complex64, LoadVector, LossRecord};

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn solved_report(max_iterations: usize, history: bool) -> VoltageReport {
        let ybus = AdmittanceMatrix::from_rows(vec![
            vec![c(10.0, -5.0), c(-5.0, 2.0)],
            vec![c(-5.0, 2.0), c(8.0, -3.0)],
        ])
        .unwrap();
        let loads = LoadVector::from_per_unit(vec![c(0.0, 0.0), c(0.2, 0.1)]);
        let v0 = VoltageState::new(vec![c(1.02, 0.0), c(0.97, 0.03)]);
        let result = GaussSeidelSolver::new()
            .with_max_iterations(max_iterations)
            .with_history(history)
            .solve(&ybus, &loads, &v0)
            .unwrap();
        VoltageReport::new("ULP Semarang Timur", &result, max_iterations, Diagnostics::new())
    }

    fn render<F: Fn(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_voltage_table_lists_every_bus() {
        let report = solved_report(1000, false);
        let table = render(|buf| render_voltage_table(&report, buf));
        assert!(table.contains("Region: ULP Semarang Timur"));
        assert!(table.contains("converged in 6 iterations"));
        assert!(table.contains("1.020000"));
        assert!(table.contains("0.681093"));
        assert!(!table.contains("PASS"));
    }

    #[test]
    fn test_voltage_table_with_history() {
        let report = solved_report(2, true);
        let table = render(|buf| render_voltage_table(&report, buf));
        assert!(table.contains("did not converge after 2 of 2 iterations"));
        assert!(table.contains("PASS"));
        assert_eq!(report.history.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_voltage_report_json_shape() {
        let report = solved_report(1000, false);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "converged");
        assert_eq!(value["iterations"], 6);
        assert_eq!(value["buses"].as_array().unwrap().len(), 2);
        assert_eq!(value["voltages"][0], serde_json::json!([1.02, 0.0]));
        assert!(value.get("history").is_none());
    }

    #[test]
    fn test_batch_table_marks_failures() {
        let entries = vec![
            BatchEntry::Solved(solved_report(1000, false)),
            BatchEntry::Failed {
                region: "Broken".into(),
                error: "Degenerate network".into(),
            },
        ];
        let table = render(|buf| render_batch_table(&entries, buf));
        assert!(table.contains("ULP Semarang Timur"));
        assert!(table.contains("error: Degenerate network"));
    }

    #[test]
    fn test_loss_table() {
        let record = LossRecord::new(2000.0, 1445.0).unwrap();
        let comparison = compare_losses(&record, Some(1.445)).unwrap();
        let projection = project(1445.0, 2000.0, 2, 0.85).unwrap();
        let report =
            LossReport::new("ULP Boja", comparison, &projection, &["May 24", "June 24"]).unwrap();

        let table = render(|buf| render_loss_table(&report, buf));
        assert!(table.contains("Initial loss: 2,000 kWh"));
        assert!(table.contains("Current loss: 1,445 kWh (72.25% of initial)"));
        assert!(table.contains("Post-optimization estimate: 1,000 kWh (50.00% of initial"));
        assert!(table.contains("May 24"));
        assert!(table.contains("June 24"));
        assert!(table.contains("1,228"));
    }

    #[test]
    fn test_loss_report_requires_matching_labels() {
        let record = LossRecord::new(2000.0, 1000.0).unwrap();
        let comparison = compare_losses(&record, None).unwrap();
        let projection = project(1000.0, 2000.0, 3, 0.85).unwrap();
        assert!(LossReport::new("x", comparison, &projection, &["May 24"]).is_err());
    }
}
