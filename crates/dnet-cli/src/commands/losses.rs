use anyhow::Result;
use dnet_algo::compare_losses;
use dnet_cli::{
    common::OutputFormat,
    config::DnetConfig,
    labels::month_labels,
    report::{render_loss_table, LossReport},
};
use tracing::debug;

/// Loss comparison and month-labelled projection for one catalog region.
pub fn build_report(config: &DnetConfig, name: &str) -> Result<LossReport> {
    let region = config.regions.get(name)?;
    let record = region.loss_record()?;
    let settings = &config.projection;

    let comparison = compare_losses(&record, settings.post_optimization_divisor)?;
    let projection = settings.projector().project(&record)?;
    let labels = month_labels(settings.start_date()?, projection.len())?;
    debug!(
        region = name,
        periods = projection.len(),
        decay = settings.decay_factor,
        "projected losses"
    );

    Ok(LossReport::new(name, comparison, &projection, &labels)?)
}

pub fn handle(config: &DnetConfig, region: &str, format: OutputFormat) -> Result<()> {
    let report = build_report(config, region)?;
    super::emit(&report, format, |report, out| render_loss_table(report, out))
}
