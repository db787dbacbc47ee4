use std::path::Path;

use anyhow::Context;
use clap::Parser;
use dnet_cli::{
    cli::{Cli, Commands},
    config::DnetConfig,
};
use tracing::{debug, error};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(err) = run(cli) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DnetConfig> {
    let config = match path {
        Some(path) => DnetConfig::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => DnetConfig::load().context("loading the default configuration")?,
    };
    debug!(regions = config.regions.len(), "configuration ready");
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Commands::Completions { shell, out } => {
            commands::completions::handle(shell, out.as_deref())
        }
        Commands::Regions => {
            let config = load_config(cli.config.as_deref())?;
            commands::regions::handle(&config, format)
        }
        Commands::Pf {
            region,
            all: _,
            solver,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            config.apply_solver_args(&solver);
            commands::pf::handle(&config, region.as_deref(), format)
        }
        Commands::Losses { region, projection } => {
            let mut config = load_config(cli.config.as_deref())?;
            config.apply_projection_args(&projection);
            commands::losses::handle(&config, &region, format)
        }
        Commands::Analyze {
            region,
            solver,
            projection,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            config.apply_solver_args(&solver);
            config.apply_projection_args(&projection);
            commands::analyze::handle(&config, &region, format)
        }
    }
}
