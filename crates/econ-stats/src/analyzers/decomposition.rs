//! Additive time-series decomposition
//!
//! Splits a series into `trend + seasonal + residual`. The trend is a
//! centred moving average over one cycle, the seasonal component is the
//! zero-mean average of the detrended series at each phase, and the
//! residual is what remains.

use serde::{Deserialize, Serialize};

use crate::batch::{BatchResult, run_per_entity};
use crate::error::{Result, StatsError};
use crate::panel::{EntityKey, Panel};
use crate::statistic::{Statistic, Undefined};

/// Additive components of one entity's series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    /// Cycle length used for the decomposition
    pub period: usize,
    pub periods: Vec<i32>,
    pub observed: Vec<f64>,
    pub trend: Vec<Statistic>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Statistic>,
}

impl Decomposition {
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// `trend + seasonal + residual` at every point where the trend is defined
    pub fn reconstruct(&self) -> Vec<Statistic> {
        self.trend
            .iter()
            .zip(&self.seasonal)
            .zip(&self.residual)
            .map(|((t, &s), r)| match (t.value(), r.value()) {
                (Some(t), Some(r)) => Statistic::from_f64(t + s + r),
                _ => Statistic::Undefined(Undefined::InsufficientHistory),
            })
            .collect()
    }
}

pub type DecompositionResult = BatchResult<Decomposition>;

/// Decompose one series with cycle length `period`
pub fn decompose_series(
    entity: &str,
    periods: &[i32],
    series: &[Option<f64>],
    period: usize,
) -> Result<Decomposition> {
    if periods.len() != series.len() {
        return Err(StatsError::ShapeMismatch(format!(
            "{entity}: {} periods for a series of length {}",
            periods.len(),
            series.len()
        )));
    }
    if period == 0 {
        return Err(StatsError::insufficient(entity, "decomposition period must be positive"));
    }
    if series.len() < 2 * period {
        return Err(StatsError::insufficient(
            entity,
            format!(
                "{} observations cannot hold two full cycles of period {period}",
                series.len()
            ),
        ));
    }
    let observed: Vec<f64> = series
        .iter()
        .copied()
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| StatsError::insufficient(entity, "series contains missing values"))?;

    let trend = centered_moving_average(&observed, period);

    let detrended: Vec<Option<f64>> = observed
        .iter()
        .zip(&trend)
        .map(|(&x, t)| t.value().map(|t| x - t))
        .collect();

    let mut phase_means: Vec<f64> = (0..period)
        .map(|phase| {
            let values: Vec<f64> = detrended
                .iter()
                .skip(phase)
                .step_by(period)
                .filter_map(|v| *v)
                .collect();
            values.iter().sum::<f64>() / values.len() as f64
        })
        .collect();
    let centre = phase_means.iter().sum::<f64>() / period as f64;
    for m in &mut phase_means {
        *m -= centre;
    }

    let seasonal: Vec<f64> = (0..observed.len()).map(|i| phase_means[i % period]).collect();
    let residual = detrended
        .iter()
        .zip(&seasonal)
        .map(|(d, s)| match d {
            Some(d) => Statistic::from_f64(d - s),
            None => Statistic::Undefined(Undefined::InsufficientHistory),
        })
        .collect();

    Ok(Decomposition {
        period,
        periods: periods.to_vec(),
        observed,
        trend,
        seasonal,
        residual,
    })
}

/// Centred moving average spanning one cycle.
///
/// Even cycles use `period + 1` points with half weight at both ends. The
/// first and last `period / 2` entries are undefined.
fn centered_moving_average(series: &[f64], period: usize) -> Vec<Statistic> {
    let half = period / 2;
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0; period + 1];
        w[0] = 0.5;
        w[period] = 0.5;
        w
    } else {
        vec![1.0; period]
    };
    let scale = period as f64;

    (0..series.len())
        .map(|i| {
            if i < half || i + half >= series.len() {
                return Statistic::Undefined(Undefined::InsufficientHistory);
            }
            let start = i - half;
            let sum: f64 = weights
                .iter()
                .zip(&series[start..start + weights.len()])
                .map(|(w, x)| w * x)
                .sum();
            Statistic::from_f64(sum / scale)
        })
        .collect()
}

/// Decompose one entity of the panel
pub fn decompose(panel: &Panel, entity: &str, period: usize) -> Result<Decomposition> {
    decompose_series(entity, panel.periods(), panel.series(entity)?, period)
}

/// Decompose each requested entity with the same cycle length, in request order
pub fn decompose_batch<S: AsRef<str>>(
    panel: &Panel,
    entities: &[S],
    period: usize,
    parallel: bool,
) -> Result<DecompositionResult> {
    let periods = vec![period; entities.len()];
    decompose_with_periods(panel, entities, &periods, parallel)
}

/// Decompose each requested entity with its own cycle length.
///
/// `periods[i]` applies to `entities[i]`; differing lengths are rejected
/// before any work is done.
pub fn decompose_with_periods<S: AsRef<str>>(
    panel: &Panel,
    entities: &[S],
    periods: &[usize],
    parallel: bool,
) -> Result<DecompositionResult> {
    if entities.len() != periods.len() {
        return Err(StatsError::ShapeMismatch(format!(
            "{} entities but {} decomposition periods",
            entities.len(),
            periods.len()
        )));
    }

    let mut items = Vec::with_capacity(entities.len());
    for (entity, &period) in entities.iter().zip(periods) {
        let key = entity.as_ref();
        items.push((EntityKey::from(key), (panel.series(key)?, period)));
    }

    let labels = panel.periods();
    Ok(run_per_entity(items, parallel, |key, (series, period)| {
        decompose_series(key.as_str(), labels, series, period)
    }))
}

/// Zip entity labels with a companion list of results of the same length
pub fn pair_with_entities<'a, S: AsRef<str>, T>(
    entities: &'a [S],
    results: &'a [T],
) -> Result<Vec<(&'a str, &'a T)>> {
    if entities.len() != results.len() {
        return Err(StatsError::ShapeMismatch(format!(
            "{} entities but {} results",
            entities.len(),
            results.len()
        )));
    }
    Ok(entities
        .iter()
        .map(AsRef::as_ref)
        .zip(results)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn dense(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn years(n: usize) -> Vec<i32> {
        (0..n as i32).map(|i| 2000 + i).collect()
    }

    fn assert_reconstructs(d: &Decomposition) {
        for (rebuilt, &original) in d.reconstruct().iter().zip(&d.observed) {
            if let Some(value) = rebuilt.value() {
                assert_relative_eq!(value, original, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_period_length_mismatch() {
        let series = dense(&[3.0, 1.0, 4.0, 1.0]);
        let err = decompose_series("Ireland", &years(5), &series, 1).unwrap_err();
        assert!(matches!(err, StatsError::ShapeMismatch(_)));
    }

    #[test]
    fn test_period_one_is_trend_only() {
        let series = dense(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        let d = decompose_series("Ireland", &years(5), &series, 1).unwrap();

        assert_eq!(d.len(), 5);
        assert!(d.seasonal.iter().all(|&s| s == 0.0));
        for (t, &x) in d.trend.iter().zip(&d.observed) {
            assert_eq!(t.value(), Some(x));
        }
        assert!(d.residual.iter().all(|r| r.value() == Some(0.0)));
    }

    #[test]
    fn test_odd_period_trend() {
        let series = dense(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let d = decompose_series("Germany", &years(6), &series, 3).unwrap();

        assert!(d.trend[0].is_undefined());
        assert!(d.trend[5].is_undefined());
        assert_relative_eq!(d.trend[1].value().unwrap(), 2.0);
        assert_relative_eq!(d.trend[4].value().unwrap(), 5.0);
        assert_reconstructs(&d);
    }

    #[test]
    fn test_even_period_recovers_seasonality() {
        // Linear trend plus a +1/-1 cycle of length 2
        let values: Vec<f64> = (0..10)
            .map(|i| i as f64 + if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let d = decompose_series("Japan", &years(10), &dense(&values), 2).unwrap();

        assert!(d.trend[0].is_undefined());
        assert!(d.trend[9].is_undefined());
        for i in 1..9 {
            assert_relative_eq!(d.trend[i].value().unwrap(), i as f64, epsilon = 1e-12);
        }
        assert_relative_eq!(d.seasonal[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(d.seasonal[1], -1.0, epsilon = 1e-12);
        assert_relative_eq!(d.seasonal.iter().take(2).sum::<f64>(), 0.0, epsilon = 1e-12);
        assert_reconstructs(&d);
    }

    #[test]
    fn test_period_too_long() {
        let series = dense(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(matches!(
            decompose_series("France", &years(5), &series, 3),
            Err(StatsError::InsufficientData { .. })
        ));
        assert!(matches!(
            decompose_series("France", &years(5), &series, 0),
            Err(StatsError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_missing_values_rejected() {
        let series = vec![Some(1.0), None, Some(3.0), Some(4.0)];
        assert!(matches!(
            decompose_series("China", &years(4), &series, 1),
            Err(StatsError::InsufficientData { .. })
        ));
    }

    fn panel() -> Panel {
        Panel::builder(years(6))
            .dense("United States", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap()
            .dense("Russian Federation", &[6.0, 5.0, 4.0, 3.0, 2.0, 1.0])
            .unwrap()
            .entity("Ireland", vec![Some(1.0), None, Some(1.0), Some(1.0), Some(1.0), Some(1.0)])
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_batch_in_request_order() {
        let requested = ["Ireland", "United States", "Russian Federation"];
        let result = decompose_batch(&panel(), &requested, 1, true).unwrap();

        let order: Vec<&str> = result.entities().map(EntityKey::as_str).collect();
        assert_eq!(order, requested);
        assert!(result.value("United States").is_some());
        assert!(matches!(
            result.get("Ireland"),
            Some(Err(StatsError::InsufficientData { .. }))
        ));
    }

    #[test]
    fn test_batch_unknown_entity() {
        assert_eq!(
            decompose_batch(&panel(), &["Atlantis"], 1, false).unwrap_err(),
            StatsError::UnknownEntity("Atlantis".to_string())
        );
    }

    #[test]
    fn test_auxiliary_length_mismatch() {
        // Unknown entity would also fail; the length check must come first
        let err = decompose_with_periods(&panel(), &["Atlantis", "Ireland"], &[1], false).unwrap_err();
        assert!(matches!(err, StatsError::ShapeMismatch(_)));

        let result =
            decompose_with_periods(&panel(), &["United States", "Russian Federation"], &[1, 3], false)
                .unwrap();
        assert_eq!(result.value("United States").unwrap().period, 1);
        assert_eq!(result.value("Russian Federation").unwrap().period, 3);
    }

    #[test]
    fn test_pair_with_entities() {
        let d = decompose(&panel(), "United States", 1).unwrap();
        let pairs = pair_with_entities(&["United States"], std::slice::from_ref(&d)).unwrap();
        assert_eq!(pairs[0].0, "United States");

        let err = pair_with_entities(&["United States", "Ireland"], &[d]).unwrap_err();
        assert!(matches!(err, StatsError::ShapeMismatch(_)));
    }

    proptest! {
        #[test]
        fn prop_components_reconstruct(
            values in prop::collection::vec(-1.0e4f64..1.0e4, 4..48),
            period in 1usize..6,
        ) {
            prop_assume!(values.len() >= 2 * period);
            let d = decompose_series("Prop", &years(values.len()), &dense(&values), period).unwrap();
            for (rebuilt, &original) in d.reconstruct().iter().zip(&values) {
                if let Some(v) = rebuilt.value() {
                    prop_assert!((v - original).abs() < 1e-6);
                }
            }
        }
    }
}
