use anyhow::{bail, Result};
use dnet_cli::{
    common::OutputFormat,
    config::DnetConfig,
    report::{render_batch_table, render_voltage_table, BatchEntry, VoltageReport},
};
use dnet_core::inspect_admittance;
use tracing::{info, warn};

/// Solve one catalog region with the configured solver.
pub fn solve_region(config: &DnetConfig, name: &str) -> Result<VoltageReport> {
    let region = config.regions.get(name)?;
    let case = region.to_case(name, config.loads.scaling()?)?;

    let diagnostics = inspect_admittance(&case.ybus);
    if diagnostics.has_issues() {
        warn!(region = name, "admittance matrix: {}", diagnostics.summary());
    }

    let result = config.solver.build_solver().solve_case(&case)?;
    if !result.converged() {
        warn!(
            region = name,
            iterations = result.iterations_run,
            "power flow did not converge; reporting the last estimate"
        );
    }
    Ok(VoltageReport::new(
        name,
        &result,
        config.solver.max_iterations,
        diagnostics,
    ))
}

pub fn handle(config: &DnetConfig, region: Option<&str>, format: OutputFormat) -> Result<()> {
    match region {
        Some(name) => {
            let report = solve_region(config, name)?;
            super::emit(&report, format, |report, out| {
                render_voltage_table(report, out)
            })
        }
        None => handle_all(config, format),
    }
}

fn handle_all(config: &DnetConfig, format: OutputFormat) -> Result<()> {
    if config.regions.is_empty() {
        bail!("no regions configured; pass --config or create ~/.dnet/config.toml");
    }
    let cases = config.regions.cases(config.loads.scaling()?)?;
    info!(regions = cases.len(), "solving all regions");

    let results = config.solver.build_solver().solve_batch(&cases);
    let entries: Vec<BatchEntry> = cases
        .iter()
        .zip(results)
        .map(|(case, result)| match result {
            Ok(result) => BatchEntry::Solved(VoltageReport::new(
                case.name.clone(),
                &result,
                config.solver.max_iterations,
                inspect_admittance(&case.ybus),
            )),
            Err(err) => {
                warn!(region = %case.name, "power flow failed: {err}");
                BatchEntry::Failed {
                    region: case.name.clone(),
                    error: err.to_string(),
                }
            }
        })
        .collect();

    super::emit(&entries, format, |entries, out| {
        render_batch_table(entries, out)
    })
}
