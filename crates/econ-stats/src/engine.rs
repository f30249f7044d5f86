//! Panel analyzer facade applying configured defaults

use std::sync::Arc;

use crate::analyzers::{
    self, CorrelationResult, Decomposition, DecompositionResult, GrowthRateResult,
    RegressionMode, RegressionResult, RollingStatsResult,
};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::panel::Panel;

/// Runs the analyzers with the window, period, mode and parallelism of an [`AnalysisConfig`]
#[derive(Debug, Clone, Default)]
pub struct PanelAnalyzer {
    config: Arc<AnalysisConfig>,
}

impl PanelAnalyzer {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn correlation(&self, a: &Panel, b: &Panel) -> Result<CorrelationResult> {
        analyzers::correlate(a, b, self.config.parallel)
    }

    pub fn growth_rates(&self, panel: &Panel) -> Result<GrowthRateResult> {
        analyzers::growth_rates(panel, self.config.parallel)
    }

    /// Rolling statistics with the configured window
    pub fn rolling(&self, panel: &Panel) -> Result<RollingStatsResult> {
        self.rolling_with(panel, self.config.rolling_window)
    }

    pub fn rolling_with(&self, panel: &Panel, window: usize) -> Result<RollingStatsResult> {
        analyzers::rolling_statistics(panel, window, self.config.parallel)
    }

    /// Regression in the configured output mode
    pub fn regression(&self, x: &Panel, y: &Panel) -> Result<RegressionResult> {
        self.regression_with(x, y, self.config.regression_mode)
    }

    pub fn regression_with(&self, x: &Panel, y: &Panel, mode: RegressionMode) -> Result<RegressionResult> {
        analyzers::regress(x, y, mode, self.config.parallel)
    }

    pub fn decompose(&self, panel: &Panel, entity: &str) -> Result<Decomposition> {
        analyzers::decompose(panel, entity, self.config.decomposition_period)
    }

    pub fn decompose_batch<S: AsRef<str>>(&self, panel: &Panel, entities: &[S]) -> Result<DecompositionResult> {
        analyzers::decompose_batch(panel, entities, self.config.decomposition_period, self.config.parallel)
    }
}
