//! Statistical analyzers
//!
//! Each analyzer is a pure function of its input panels. None of them
//! call each other or mutate their inputs.

pub mod correlation;
pub mod decomposition;
pub mod growth;
pub mod regression;
pub mod report;
pub mod rolling;

pub use correlation::{CorrelationResult, correlate, pearson};
pub use decomposition::{
    Decomposition, DecompositionResult, decompose, decompose_batch, decompose_series,
    decompose_with_periods, pair_with_entities,
};
pub use growth::{GrowthRateResult, GrowthSeries, growth_rates, pct_change};
pub use regression::{
    OlsFit, RegressionDiagnostics, RegressionMode, RegressionOutput, RegressionResult,
    fit_entity, regress,
};
pub use report::{Coefficient, RegressionReport};
pub use rolling::{RollingStats, RollingStatsResult, RollingStatsRow, rolling_series, rolling_statistics};
