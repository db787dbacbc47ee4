use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::common::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "dnet", author, version, about, long_about = None)]
/// Distribution network power flow and loss projection
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// Configuration file with solver settings and the region catalog
    /// (defaults to ~/.dnet/config.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the regions in the catalog
    Regions,
    /// Solve bus voltages with Gauss-Seidel iteration
    Pf {
        /// Region name from the catalog
        #[arg(long, required_unless_present = "all", conflicts_with = "all")]
        region: Option<String>,
        /// Solve every region in the catalog
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// Compare measured losses and project their reduction
    Losses {
        /// Region name from the catalog
        #[arg(long)]
        region: String,
        #[command(flatten)]
        projection: ProjectionArgs,
    },
    /// Power flow followed by the loss projection for one region
    Analyze {
        /// Region name from the catalog
        #[arg(long)]
        region: String,
        #[command(flatten)]
        solver: SolverArgs,
        #[command(flatten)]
        projection: ProjectionArgs,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// Solver overrides; unset flags fall back to the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct SolverArgs {
    /// Convergence tolerance on voltage change (pu)
    #[arg(long)]
    pub tol: Option<f64>,
    /// Maximum Gauss-Seidel passes
    #[arg(long)]
    pub max_iter: Option<usize>,
    /// Convergence test between passes
    #[arg(long, value_enum)]
    pub criterion: Option<CriterionArg>,
    /// kW (and kVAR) per unit of load on the admittance base
    #[arg(long)]
    pub kw_per_unit: Option<f64>,
    /// Report bus voltage magnitudes after every pass
    #[arg(long)]
    pub history: bool,
}

/// Projection overrides; unset flags fall back to the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectionArgs {
    /// Number of projected periods
    #[arg(long)]
    pub periods: Option<usize>,
    /// Per-period loss multiplier
    #[arg(long)]
    pub decay: Option<f64>,
    /// First projected month (YYYY-MM)
    #[arg(long)]
    pub start_month: Option<String>,
    /// Divisor for the post-optimization loss estimate
    #[arg(long)]
    pub post_divisor: Option<f64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CriterionArg {
    /// Largest voltage change below tolerance
    MaxAbs,
    /// Elementwise closeness with relative tolerance
    AllClose,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
