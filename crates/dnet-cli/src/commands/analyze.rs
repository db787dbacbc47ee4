use std::io::Write;

use anyhow::Result;
use dnet_cli::{
    common::OutputFormat,
    config::DnetConfig,
    report::{render_loss_table, render_voltage_table, AnalysisReport},
};

use super::{losses, pf};

pub fn handle(config: &DnetConfig, region: &str, format: OutputFormat) -> Result<()> {
    let report = AnalysisReport {
        power_flow: pf::solve_region(config, region)?,
        losses: losses::build_report(config, region)?,
    };
    super::emit(&report, format, |report, out| {
        render_voltage_table(&report.power_flow, out)?;
        writeln!(out)?;
        render_loss_table(&report.losses, out)
    })
}
