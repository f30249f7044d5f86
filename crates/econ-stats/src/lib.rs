//! Statistical analysis of country-by-year economic indicator panels
//!
//! This crate turns a cleaned, entity-indexed [`Panel`] into typed result
//! sets for reporting and plotting layers. It provides:
//!
//! - Per-entity Pearson correlation between two indicators
//! - Period-over-period growth rates
//! - Trailing-window mean, std, median, variance, skew and kurtosis
//! - Per-entity OLS regression with compact diagnostics or a full report
//! - Additive trend / seasonal / residual decomposition
//!
//! Undefined quantities are explicit [`Statistic::Undefined`] markers.
//! Failures that only concern one entity are kept in that entity's slot of
//! the returned [`BatchResult`]; structural errors abort the call.
//!
//! # Example
//!
//! ```rust
//! use econ_stats::{Panel, PanelAnalyzer};
//!
//! # fn main() -> econ_stats::Result<()> {
//! let gdp = Panel::builder(vec![2000, 2001, 2002])
//!     .dense("Ireland", &[100.0, 150.0, 120.0])?
//!     .build()?;
//!
//! let growth = PanelAnalyzer::default().growth_rates(&gdp)?;
//! let rates = &growth.value("Ireland").unwrap().rates;
//! assert_eq!(rates[0].value(), Some(50.0));
//! # Ok(())
//! # }
//! ```

pub mod analyzers;
pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod interpolate;
pub mod panel;
pub mod statistic;

pub use analyzers::{
    CorrelationResult, Decomposition, DecompositionResult, GrowthRateResult, GrowthSeries,
    RegressionDiagnostics, RegressionMode, RegressionOutput, RegressionReport, RegressionResult,
    RollingStats, RollingStatsResult, RollingStatsRow,
};
pub use batch::BatchResult;
pub use config::AnalysisConfig;
pub use engine::PanelAnalyzer;
pub use error::{Result, StatsError};
pub use panel::{EntityKey, Panel, PanelBuilder};
pub use statistic::{Statistic, Undefined};
