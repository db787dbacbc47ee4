//! Configuration for the `dnet` command line.
//!
//! [`DnetConfig`] holds solver settings, the load unit convention, the loss
//! projection assumptions, and the region catalog. It is stored in
//! `~/.dnet/config.toml` by default and supports partial files where
//! unspecified values use the defaults below. Command-line flags override
//! file values.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dnet_algo::{
    losses::{DEFAULT_DECAY_FACTOR, DEFAULT_PERIODS},
    ConvergenceCriterion, GaussSeidelSolver, LossProjector, DEFAULT_MAX_ITERATIONS,
    DEFAULT_TOLERANCE,
};
use dnet_core::{DnetError, DnetResult, LoadScaling};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::{CriterionArg, ProjectionArgs, SolverArgs};
use crate::labels::parse_start_month;
use crate::regions::RegionCatalog;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DnetConfig {
    pub solver: SolverConfig,
    pub loads: LoadConfig,
    pub projection: ProjectionConfig,
    pub regions: RegionCatalog,
}

/// Which convergence test the solver applies between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    #[default]
    MaxAbs,
    AllClose,
}

impl From<CriterionArg> for CriterionKind {
    fn from(arg: CriterionArg) -> Self {
        match arg {
            CriterionArg::MaxAbs => CriterionKind::MaxAbs,
            CriterionArg::AllClose => CriterionKind::AllClose,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub criterion: CriterionKind,
    /// Relative tolerance for the `all_close` criterion.
    pub rtol: f64,
    pub record_history: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            criterion: CriterionKind::MaxAbs,
            rtol: ConvergenceCriterion::DEFAULT_RTOL,
            record_history: false,
        }
    }
}

impl SolverConfig {
    pub fn criterion(&self) -> ConvergenceCriterion {
        match self.criterion {
            CriterionKind::MaxAbs => ConvergenceCriterion::MaxAbs,
            CriterionKind::AllClose => ConvergenceCriterion::AllClose { rtol: self.rtol },
        }
    }

    /// Solver configured from these settings. Invalid values surface when the
    /// solver runs.
    pub fn build_solver(&self) -> GaussSeidelSolver {
        GaussSeidelSolver::new()
            .with_tolerance(self.tolerance)
            .with_max_iterations(self.max_iterations)
            .with_criterion(self.criterion())
            .with_history(self.record_history)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// kW (and kVAR) per unit of load on the admittance base.
    pub kw_per_unit: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            kw_per_unit: LoadScaling::KW_TO_MW.kw_per_unit,
        }
    }
}

impl LoadConfig {
    pub fn scaling(&self) -> DnetResult<LoadScaling> {
        LoadScaling::new(self.kw_per_unit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub periods: usize,
    pub decay_factor: f64,
    /// First projected month, `YYYY-MM`.
    pub start_month: String,
    /// Divisor for the post-optimization estimate; omitted when unset.
    pub post_optimization_divisor: Option<f64>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            periods: DEFAULT_PERIODS,
            decay_factor: DEFAULT_DECAY_FACTOR,
            start_month: "2024-05".to_string(),
            post_optimization_divisor: None,
        }
    }
}

impl ProjectionConfig {
    pub fn projector(&self) -> LossProjector {
        LossProjector::new()
            .with_periods(self.periods)
            .with_decay_factor(self.decay_factor)
    }

    pub fn start_date(&self) -> DnetResult<NaiveDate> {
        parse_start_month(&self.start_month)
    }
}

impl DnetConfig {
    /// Get the default config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".dnet"))
    }

    /// Get the default config file path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load configuration from the default location.
    ///
    /// Returns default config if file doesn't exist.
    pub fn load() -> DnetResult<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> DnetResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            DnetError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        let config = Self::from_toml(&contents)
            .map_err(|err| DnetError::Config(format!("{}: {err}", path.display())))?;
        debug!(
            path = %path.display(),
            regions = config.regions.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> DnetResult<Self> {
        toml::from_str(contents).map_err(|err| DnetError::Parse(err.to_string()))
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> DnetResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|err| DnetError::Other(err.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Overlay solver flags given on the command line.
    pub fn apply_solver_args(&mut self, args: &SolverArgs) {
        if let Some(tol) = args.tol {
            self.solver.tolerance = tol;
        }
        if let Some(max_iter) = args.max_iter {
            self.solver.max_iterations = max_iter;
        }
        if let Some(criterion) = args.criterion {
            self.solver.criterion = criterion.into();
        }
        if let Some(kw_per_unit) = args.kw_per_unit {
            self.loads.kw_per_unit = kw_per_unit;
        }
        if args.history {
            self.solver.record_history = true;
        }
    }

    /// Overlay projection flags given on the command line.
    pub fn apply_projection_args(&mut self, args: &ProjectionArgs) {
        if let Some(periods) = args.periods {
            self.projection.periods = periods;
        }
        if let Some(decay) = args.decay {
            self.projection.decay_factor = decay;
        }
        if let Some(start_month) = &args.start_month {
            self.projection.start_month = start_month.clone();
        }
        if let Some(divisor) = args.post_divisor {
            self.projection.post_optimization_divisor = Some(divisor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
[solver]
tolerance = 1e-8
criterion = "all_close"

[projection]
periods = 6
post_optimization_divisor = 1.445

[regions."ULP Weleri"]
ybus = [[[12.0, -6.0], [-6.0, 3.0]], [[-6.0, 3.0], [10.0, -4.0]]]
p_load_kw = [0.0, 250.0]
q_load_kvar = [0.0, 120.0]
v_initial = [[1.0, 0.0], [0.98, 0.02]]
losses = { initial_kwh = 73083664.0, current_kwh = 5193168.0 }
"#;

    #[test]
    fn test_default_config() {
        let config = DnetConfig::default();
        assert_eq!(config.solver.tolerance, 1e-6);
        assert_eq!(config.solver.max_iterations, 1000);
        assert_eq!(config.solver.criterion, CriterionKind::MaxAbs);
        assert_eq!(config.loads.kw_per_unit, 1000.0);
        assert_eq!(config.projection.periods, 12);
        assert_eq!(config.projection.decay_factor, 0.85);
        assert!(config.projection.post_optimization_divisor.is_none());
        assert!(config.regions.is_empty());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = DnetConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.solver.tolerance, 1e-8);
        assert_eq!(config.solver.max_iterations, 1000);
        assert_eq!(
            config.solver.criterion(),
            ConvergenceCriterion::AllClose { rtol: 1e-5 }
        );
        assert_eq!(config.projection.periods, 6);
        assert_eq!(config.projection.decay_factor, 0.85);
        assert_eq!(config.projection.post_optimization_divisor, Some(1.445));

        let region = config.regions.get("ULP Weleri").unwrap();
        assert_eq!(region.ybus.dim(), 2);
        assert_eq!(region.losses.current.value(), 5_193_168.0);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = DnetConfig::from_toml("[solver]\ntolerance = \"tight\"").unwrap_err();
        assert!(matches!(err, DnetError::Parse(_)));
    }

    #[test]
    fn test_ragged_admittance_is_rejected() {
        let ragged = r#"
[regions.bad]
ybus = [[[1.0, 0.0], [0.0, 0.0]], [[0.0, 0.0]]]
p_load_kw = [0.0, 1.0]
q_load_kvar = [0.0, 1.0]
v_initial = [[1.0, 0.0], [1.0, 0.0]]
losses = { initial_kwh = 1.0, current_kwh = 1.0 }
"#;
        assert!(DnetConfig::from_toml(ragged).is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = DnetConfig::from_toml(SAMPLE).unwrap();
        config.loads.kw_per_unit = 1.0;
        config.save_to(&path).unwrap();

        let loaded = DnetConfig::load_from(&path).unwrap();
        assert_eq!(loaded.loads.kw_per_unit, 1.0);
        assert_eq!(loaded.regions, config.regions);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let err = DnetConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, DnetError::Config(_)));
    }

    #[test]
    fn test_flags_override_file_values() {
        let mut config = DnetConfig::from_toml(SAMPLE).unwrap();
        config.apply_solver_args(&SolverArgs {
            tol: Some(1e-4),
            max_iter: Some(25),
            criterion: Some(CriterionArg::MaxAbs),
            kw_per_unit: Some(1.0),
            history: true,
        });
        config.apply_projection_args(&ProjectionArgs {
            periods: Some(3),
            decay: Some(0.9),
            start_month: Some("2025-01".into()),
            post_divisor: None,
        });

        assert_eq!(config.solver.tolerance, 1e-4);
        assert_eq!(config.solver.max_iterations, 25);
        assert_eq!(config.solver.criterion, CriterionKind::MaxAbs);
        assert!(config.solver.record_history);
        assert_eq!(config.loads.scaling().unwrap(), LoadScaling::IDENTITY);
        assert_eq!(config.projection.periods, 3);
        assert_eq!(config.projection.decay_factor, 0.9);
        assert_eq!(
            config.projection.start_date().unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert_eq!(config.projection.post_optimization_divisor, Some(1.445));
    }
}
