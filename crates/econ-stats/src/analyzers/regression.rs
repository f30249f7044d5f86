//! Per-entity simple linear regression
//!
//! Each entity gets one ordinary least squares fit of `y = slope * x + intercept`.
//! The same [`OlsFit`] feeds both output shapes: compact
//! [`RegressionDiagnostics`] and the full [`RegressionReport`].

use serde::{Deserialize, Serialize};

use crate::analyzers::report::RegressionReport;
use crate::batch::{BatchResult, run_per_entity};
use crate::error::{Result, StatsError};
use crate::interpolate::linear_fill;
use crate::panel::{EntityKey, Panel};
use crate::statistic::{Statistic, Undefined};

/// Which result shape a regression call produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionMode {
    /// Slope, intercept, R² and MSE only
    #[default]
    Compact,
    /// Coefficient table with standard errors, t/F statistics and p-values
    Full,
}

/// Compact numeric diagnostics of one fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionDiagnostics {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: Statistic,
    pub mse: f64,
    pub n_obs: usize,
}

/// Result of one entity's regression in the requested shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionOutput {
    Diagnostics(RegressionDiagnostics),
    Report(Box<RegressionReport>),
}

impl RegressionOutput {
    /// Compact diagnostics regardless of the output shape
    pub fn diagnostics(&self) -> RegressionDiagnostics {
        match self {
            Self::Diagnostics(d) => d.clone(),
            Self::Report(r) => r.diagnostics(),
        }
    }

    pub fn report(&self) -> Option<&RegressionReport> {
        match self {
            Self::Diagnostics(_) => None,
            Self::Report(r) => Some(r),
        }
    }
}

pub type RegressionResult = BatchResult<RegressionOutput>;

/// Sufficient statistics of an OLS fit with one regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OlsFit {
    pub n: usize,
    pub slope: f64,
    pub intercept: f64,
    pub x_mean: f64,
    /// Σ(x - x̄)²
    pub sxx: f64,
    /// Residual sum of squares
    pub ss_res: f64,
    /// Total sum of squares of y around its mean
    pub ss_tot: f64,
}

impl OlsFit {
    /// Fit `y` on `x`; both must be fully observed and equally long
    pub fn fit(entity: &str, x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(StatsError::ShapeMismatch(format!(
                "{entity}: x has {} observations, y has {}",
                x.len(),
                y.len()
            )));
        }
        let n = x.len();
        if n < 2 {
            return Err(StatsError::insufficient(
                entity,
                format!("{n} observation(s), at least 2 required"),
            ));
        }

        let nf = n as f64;
        let x_mean = x.iter().sum::<f64>() / nf;
        let y_mean = y.iter().sum::<f64>() / nf;

        let (mut sxx, mut sxy, mut ss_tot) = (0.0, 0.0, 0.0);
        for (&xi, &yi) in x.iter().zip(y) {
            let dx = xi - x_mean;
            let dy = yi - y_mean;
            sxx += dx * dx;
            sxy += dx * dy;
            ss_tot += dy * dy;
        }

        if sxx == 0.0 {
            return Err(StatsError::UndefinedStatistic {
                entity: entity.to_string(),
                reason: Undefined::ZeroVariance,
            });
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;
        // Centred residuals keep SSres <= SStot when y carries a large offset
        let ss_res = x
            .iter()
            .zip(y)
            .map(|(&xi, &yi)| {
                let e = (yi - y_mean) - slope * (xi - x_mean);
                e * e
            })
            .sum::<f64>()
            .min(ss_tot);

        Ok(Self {
            n,
            slope,
            intercept,
            x_mean,
            sxx,
            ss_res,
            ss_tot,
        })
    }

    /// `1 - SSres / SStot`; undefined for constant `y`
    pub fn r_squared(&self) -> Statistic {
        if self.ss_tot == 0.0 {
            return Statistic::Undefined(Undefined::ZeroVariance);
        }
        Statistic::from_f64(1.0 - self.ss_res / self.ss_tot)
    }

    pub fn mse(&self) -> f64 {
        self.ss_res / self.n as f64
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn diagnostics(&self) -> RegressionDiagnostics {
        RegressionDiagnostics {
            slope: self.slope,
            intercept: self.intercept,
            r_squared: self.r_squared(),
            mse: self.mse(),
            n_obs: self.n,
        }
    }

    pub fn output(&self, entity: &EntityKey, mode: RegressionMode) -> RegressionOutput {
        match mode {
            RegressionMode::Compact => RegressionOutput::Diagnostics(self.diagnostics()),
            RegressionMode::Full => {
                RegressionOutput::Report(Box::new(RegressionReport::from_fit(entity.clone(), self)))
            }
        }
    }
}

/// Regress each entity's `y` series on its `x` series.
///
/// Both panels must hold the same entities and periods. Gaps in either
/// series are filled by linear interpolation of that series alone.
pub fn regress(x: &Panel, y: &Panel, mode: RegressionMode, parallel: bool) -> Result<RegressionResult> {
    x.ensure_aligned(y)?;

    let mut items = Vec::with_capacity(x.n_entities());
    for (key, x_row) in x.iter() {
        items.push((key.clone(), (x_row, y.series(key.as_str())?)));
    }

    let result = run_per_entity(items, parallel, |key, (x_row, y_row)| {
        let fit = fit_entity(key.as_str(), x_row, y_row)?;
        Ok(fit.output(key, mode))
    });

    tracing::debug!(
        entities = result.len(),
        failed = result.failures().count(),
        ?mode,
        "regression finished"
    );
    Ok(result)
}

/// Interpolate both series of one entity and fit
pub fn fit_entity(entity: &str, x: &[Option<f64>], y: &[Option<f64>]) -> Result<OlsFit> {
    let x = linear_fill(x)
        .ok_or_else(|| StatsError::insufficient(entity, "x series is entirely missing"))?;
    let y = linear_fill(y)
        .ok_or_else(|| StatsError::insufficient(entity, "y series is entirely missing"))?;
    OlsFit::fit(entity, &x, &y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_perfect_line() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let fit = OlsFit::fit("Ireland", &x, &y).unwrap();

        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared().value().unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.mse(), 0.0, epsilon = 1e-20);
        assert_relative_eq!(fit.predict(10.0), 21.0, epsilon = 1e-12);
    }

    #[test]
    fn test_noisy_fit() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let d = OlsFit::fit("France", &x, &y).unwrap().diagnostics();

        assert_relative_eq!(d.slope, 0.6, epsilon = 1e-12);
        assert_relative_eq!(d.intercept, 2.2, epsilon = 1e-12);
        assert_relative_eq!(d.r_squared.value().unwrap(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(d.mse, 0.48, epsilon = 1e-12);
        assert_eq!(d.n_obs, 5);
    }

    #[test]
    fn test_constant_y_r_squared_undefined() {
        let fit = OlsFit::fit("Japan", &[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap();
        assert_eq!(fit.r_squared(), Statistic::Undefined(Undefined::ZeroVariance));
        assert_relative_eq!(fit.slope, 0.0);
    }

    #[test]
    fn test_constant_x_is_undefined() {
        let err = OlsFit::fit("Japan", &[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            StatsError::UndefinedStatistic {
                entity: "Japan".to_string(),
                reason: Undefined::ZeroVariance,
            }
        );
    }

    #[test]
    fn test_interpolates_each_series_from_itself() {
        let x = [Some(1.0), None, Some(3.0), Some(4.0)];
        let y = [Some(3.0), Some(5.0), None, Some(9.0)];
        let fit = fit_entity("Germany", &x, &y).unwrap();
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_entirely_missing_fails() {
        let err = fit_entity("China", &[Some(1.0), Some(2.0)], &[None, None]).unwrap_err();
        assert!(matches!(err, StatsError::InsufficientData { ref entity, .. } if entity == "China"));
    }

    #[test]
    fn test_failure_isolated_per_entity() {
        let gdp = Panel::builder(vec![2000, 2001, 2002, 2003])
            .dense("Ireland", &[1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .dense("Russian Federation", &[1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .build()
            .unwrap();
        let inflation = Panel::builder(vec![2000, 2001, 2002, 2003])
            .dense("Ireland", &[3.0, 5.0, 7.0, 9.0])
            .unwrap()
            .entity("Russian Federation", vec![None; 4])
            .unwrap()
            .build()
            .unwrap();

        let result = regress(&gdp, &inflation, RegressionMode::Compact, true).unwrap();
        assert_eq!(result.len(), 2);
        assert!(!result.is_complete());

        let ireland = result.value("Ireland").unwrap().diagnostics();
        assert_relative_eq!(ireland.slope, 2.0, epsilon = 1e-12);
        assert!(matches!(
            result.get("Russian Federation"),
            Some(Err(StatsError::InsufficientData { .. }))
        ));
    }

    #[test]
    fn test_full_mode_produces_report() {
        let x = Panel::builder(vec![2000, 2001, 2002, 2003, 2004])
            .dense("France", &[1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .build()
            .unwrap();
        let y = Panel::builder(vec![2000, 2001, 2002, 2003, 2004])
            .dense("France", &[2.0, 4.0, 5.0, 4.0, 5.0])
            .unwrap()
            .build()
            .unwrap();

        let result = regress(&x, &y, RegressionMode::Full, false).unwrap();
        let output = result.value("France").unwrap();
        let report = output.report().unwrap();
        assert_eq!(report.entity.as_str(), "France");
        assert_relative_eq!(output.diagnostics().slope, 0.6, epsilon = 1e-12);

        let compact = regress(&x, &y, RegressionMode::Compact, false).unwrap();
        assert!(compact.value("France").unwrap().report().is_none());
        assert_eq!(
            compact.value("France").unwrap().diagnostics(),
            output.diagnostics()
        );
    }

    #[test]
    fn test_r_squared_with_gdp_scale_offset() {
        let x = [1.5, 7.0, 22.0, 38.5, 41.0, 63.0, 88.0];
        let y: Vec<f64> = [3.2, 9.1, 0.4, 6.6, 7.7, 1.9, 5.0]
            .iter()
            .map(|v| 1.0e12 + v)
            .collect();
        let r2 = OlsFit::fit("United States", &x, &y)
            .unwrap()
            .r_squared()
            .value()
            .unwrap();
        assert!((0.0..=1.0).contains(&r2), "r2 = {r2}");
    }

    proptest! {
        #[test]
        fn prop_r_squared_bounded_for_large_offsets(
            points in prop::collection::vec((0.0f64..100.0, 0.0f64..10.0), 5..25),
        ) {
            let x: Vec<f64> = points.iter().map(|p| p.0).collect();
            let y: Vec<f64> = points.iter().map(|p| 1.0e12 + p.1).collect();
            if let Ok(fit) = OlsFit::fit("United States", &x, &y) {
                if let Some(r2) = fit.r_squared().value() {
                    prop_assert!((0.0..=1.0).contains(&r2), "r2 = {}", r2);
                }
            }
        }
    }
}
