//! Configuration for panel analysis operations

use crate::analyzers::RegressionMode;
use crate::error::{Result, StatsError};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the rolling window
pub const ENV_ROLLING_WINDOW: &str = "ECON_ROLLING_WINDOW";
/// Environment variable overriding the decomposition period
pub const ENV_DECOMPOSITION_PERIOD: &str = "ECON_DECOMPOSITION_PERIOD";
/// Environment variable toggling per-entity parallelism
pub const ENV_PARALLEL: &str = "ECON_PARALLEL";

/// Defaults applied by [`PanelAnalyzer`](crate::PanelAnalyzer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Trailing window length for rolling statistics
    pub rolling_window: usize,

    /// Cycle length for decomposition (1 for annual data)
    pub decomposition_period: usize,

    /// Spread per-entity work over the rayon pool
    pub parallel: bool,

    /// Output shape of regression calls
    pub regression_mode: RegressionMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rolling_window: 3,
            decomposition_period: 1,
            parallel: true,
            regression_mode: RegressionMode::Compact,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Apply `ECON_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup(ENV_ROLLING_WINDOW) {
            self.rolling_window = parse_env(ENV_ROLLING_WINDOW, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DECOMPOSITION_PERIOD) {
            self.decomposition_period = parse_env(ENV_DECOMPOSITION_PERIOD, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PARALLEL) {
            self.parallel = parse_env(ENV_PARALLEL, &raw)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rolling_window == 0 {
            return Err(StatsError::Config(
                "rolling_window must be greater than 0".to_string(),
            ));
        }

        if self.decomposition_period == 0 {
            return Err(StatsError::Config(
                "decomposition_period must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| StatsError::Config(format!("{key} has invalid value '{raw}'")))
}

/// Builder for AnalysisConfig
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    rolling_window: Option<usize>,
    decomposition_period: Option<usize>,
    parallel: Option<bool>,
    regression_mode: Option<RegressionMode>,
}

impl AnalysisConfigBuilder {
    /// Set the rolling window length
    pub fn rolling_window(mut self, window: usize) -> Self {
        self.rolling_window = Some(window);
        self
    }

    /// Set the decomposition cycle length
    pub fn decomposition_period(mut self, period: usize) -> Self {
        self.decomposition_period = Some(period);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    pub fn regression_mode(mut self, mode: RegressionMode) -> Self {
        self.regression_mode = Some(mode);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AnalysisConfig> {
        let defaults = AnalysisConfig::default();

        let config = AnalysisConfig {
            rolling_window: self.rolling_window.unwrap_or(defaults.rolling_window),
            decomposition_period: self
                .decomposition_period
                .unwrap_or(defaults.decomposition_period),
            parallel: self.parallel.unwrap_or(defaults.parallel),
            regression_mode: self.regression_mode.unwrap_or(defaults.regression_mode),
        };

        config.validate()?;
        Ok(config)
    }
}
