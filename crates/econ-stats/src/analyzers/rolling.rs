//! Trailing-window summary statistics

use serde::{Deserialize, Serialize};

use crate::batch::{BatchResult, run_per_entity};
use crate::error::{Result, StatsError};
use crate::panel::{EntityKey, Panel};
use crate::statistic::{Statistic, Undefined};

/// Six windowed statistics of one entity, each aligned with the input periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    pub window: usize,
    pub periods: Vec<i32>,
    pub mean: Vec<Statistic>,
    pub std: Vec<Statistic>,
    pub median: Vec<Statistic>,
    pub variance: Vec<Statistic>,
    pub skew: Vec<Statistic>,
    pub kurtosis: Vec<Statistic>,
}

/// One long-format row of a rolling-statistics table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingStatsRow {
    pub entity: EntityKey,
    pub period: i32,
    pub mean: Statistic,
    pub std: Statistic,
    pub median: Statistic,
    pub variance: Statistic,
    pub skew: Statistic,
    pub kurtosis: Statistic,
}

pub type RollingStatsResult = BatchResult<RollingStats>;

/// Per-window moments; kept together so each window is scanned once
#[derive(Debug, Clone, Copy)]
struct WindowSummary {
    mean: Statistic,
    std: Statistic,
    median: Statistic,
    variance: Statistic,
    skew: Statistic,
    kurtosis: Statistic,
}

impl WindowSummary {
    fn undefined(reason: Undefined) -> Self {
        let u = Statistic::Undefined(reason);
        Self {
            mean: u,
            std: u,
            median: u,
            variance: u,
            skew: u,
            kurtosis: u,
        }
    }

    fn compute(values: &[f64]) -> Self {
        let n = values.len();
        let nf = n as f64;
        let mean = values.iter().sum::<f64>() / nf;

        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for &v in values {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        m2 /= nf;
        m3 /= nf;
        m4 /= nf;

        // The mean of a constant window can be off by one ulp, so test the values
        let flat = m2 == 0.0 || values.iter().all(|&v| v == values[0]);

        let variance = if n < 2 {
            Statistic::Undefined(Undefined::InsufficientObservations)
        } else if flat {
            Statistic::Value(0.0)
        } else {
            Statistic::from_f64(m2 * nf / (nf - 1.0))
        };

        let skew = if n < 3 {
            Statistic::Undefined(Undefined::InsufficientObservations)
        } else if flat {
            Statistic::Undefined(Undefined::ZeroVariance)
        } else {
            Statistic::from_f64((nf * (nf - 1.0)).sqrt() / (nf - 2.0) * m3 / m2.powf(1.5))
        };

        let kurtosis = if n < 4 {
            Statistic::Undefined(Undefined::InsufficientObservations)
        } else if flat {
            Statistic::Undefined(Undefined::ZeroVariance)
        } else {
            let g2 = m4 / (m2 * m2) - 3.0;
            Statistic::from_f64(
                ((nf + 1.0) * g2 + 6.0) * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0)),
            )
        };

        Self {
            mean: Statistic::from_f64(mean),
            std: variance.map(f64::sqrt),
            median: Statistic::from_f64(median(values)),
            variance,
            skew,
            kurtosis,
        }
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Rolling statistics of one series over a trailing window of `window` periods
pub fn rolling_series(series: &[Option<f64>], periods: &[i32], window: usize) -> Result<RollingStats> {
    if periods.len() != series.len() {
        return Err(StatsError::ShapeMismatch(format!(
            "{} periods for a series of length {}",
            periods.len(),
            series.len()
        )));
    }
    validate_window(window, series.len())?;

    let mut summaries = Vec::with_capacity(series.len());
    summaries.extend(
        std::iter::repeat_n(WindowSummary::undefined(Undefined::InsufficientHistory), window - 1),
    );
    for slot in series.windows(window) {
        let values: Option<Vec<f64>> = slot.iter().copied().collect();
        summaries.push(match values {
            Some(values) => WindowSummary::compute(&values),
            None => WindowSummary::undefined(Undefined::MissingInput),
        });
    }

    let column = |f: fn(&WindowSummary) -> Statistic| summaries.iter().map(f).collect::<Vec<_>>();
    Ok(RollingStats {
        window,
        periods: periods.to_vec(),
        mean: column(|s| s.mean),
        std: column(|s| s.std),
        median: column(|s| s.median),
        variance: column(|s| s.variance),
        skew: column(|s| s.skew),
        kurtosis: column(|s| s.kurtosis),
    })
}

/// Rolling statistics for every entity of the panel
pub fn rolling_statistics(panel: &Panel, window: usize, parallel: bool) -> Result<RollingStatsResult> {
    validate_window(window, panel.n_periods())?;

    let items: Vec<_> = panel
        .iter()
        .map(|(key, row)| (key.clone(), row))
        .collect();
    let periods = panel.periods();

    Ok(run_per_entity(items, parallel, |_, row| {
        rolling_series(row, periods, window)
    }))
}

fn validate_window(window: usize, len: usize) -> Result<()> {
    if window == 0 || window > len {
        return Err(StatsError::InvalidWindow { window, len });
    }
    Ok(())
}

impl BatchResult<RollingStats> {
    /// Flatten into long-format rows, one per entity and period
    pub fn rows(&self) -> Vec<RollingStatsRow> {
        let mut rows = Vec::new();
        for (entity, stats) in self.successes() {
            for (i, &period) in stats.periods.iter().enumerate() {
                rows.push(RollingStatsRow {
                    entity: entity.clone(),
                    period,
                    mean: stats.mean[i],
                    std: stats.std[i],
                    median: stats.median[i],
                    variance: stats.variance[i],
                    skew: stats.skew[i],
                    kurtosis: stats.kurtosis[i],
                });
            }
        }
        rows
    }
}
