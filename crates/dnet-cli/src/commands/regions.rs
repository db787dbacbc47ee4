use std::io::Write;

use anyhow::Result;
use dnet_cli::{
    common::{format_thousands, OutputFormat},
    config::DnetConfig,
};
use serde::Serialize;
use tabwriter::TabWriter;

#[derive(Serialize)]
struct RegionSummary<'a> {
    name: &'a str,
    buses: usize,
    initial_kwh: f64,
    current_kwh: f64,
}

pub fn handle(config: &DnetConfig, format: OutputFormat) -> Result<()> {
    let summaries: Vec<RegionSummary> = config
        .regions
        .iter()
        .map(|(name, region)| RegionSummary {
            name,
            buses: region.ybus.dim(),
            initial_kwh: region.losses.initial.value(),
            current_kwh: region.losses.current.value(),
        })
        .collect();

    if summaries.is_empty() {
        eprintln!("No regions configured. Pass --config or create ~/.dnet/config.toml.");
    }

    super::emit(&summaries, format, |rows, out| {
        let mut tw = TabWriter::new(out).padding(2);
        writeln!(tw, "REGION\tBUSES\tINITIAL LOSS (kWh)\tCURRENT LOSS (kWh)")?;
        for row in rows {
            writeln!(
                tw,
                "{}\t{}\t{}\t{}",
                row.name,
                row.buses,
                format_thousands(row.initial_kwh, 0),
                format_thousands(row.current_kwh, 0)
            )?;
        }
        tw.flush()
    })
}
