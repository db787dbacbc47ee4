//! Command-line surface for the dnet power-flow and loss-projection tools.
//!
//! The binary lives in `main.rs`; this library holds the pieces the binary
//! and the integration tests share: argument definitions, the TOML
//! configuration with its region catalog, calendar labels, and report
//! rendering.

pub mod cli;
pub mod common;
pub mod config;
pub mod labels;
pub mod regions;
pub mod report;

pub use cli::{build_cli_command, Cli, Commands, ProjectionArgs, SolverArgs};
pub use config::DnetConfig;
pub use regions::{Region, RegionCatalog};
