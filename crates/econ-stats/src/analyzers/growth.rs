//! Period-over-period growth rates

use serde::{Deserialize, Serialize};

use crate::batch::{BatchResult, run_per_entity};
use crate::error::Result;
use crate::panel::Panel;
use crate::statistic::{Statistic, Undefined};

/// Percentage changes of one entity, labelled by the later period of each pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSeries {
    pub periods: Vec<i32>,
    pub rates: Vec<Statistic>,
}

pub type GrowthRateResult = BatchResult<GrowthSeries>;

/// Compute `(v[t+1] - v[t]) / v[t] * 100` for every adjacent pair of every entity
pub fn growth_rates(panel: &Panel, parallel: bool) -> Result<GrowthRateResult> {
    let items: Vec<_> = panel
        .iter()
        .map(|(key, row)| (key.clone(), row))
        .collect();
    let labels: Vec<i32> = panel.periods().iter().skip(1).copied().collect();

    Ok(run_per_entity(items, parallel, |_, row| {
        Ok(GrowthSeries {
            periods: labels.clone(),
            rates: pct_change(row),
        })
    }))
}

/// Growth rates of one series; output is one shorter than the input
pub fn pct_change(series: &[Option<f64>]) -> Vec<Statistic> {
    series
        .windows(2)
        .map(|pair| match (pair[0], pair[1]) {
            (Some(prev), Some(_)) if prev == 0.0 => Statistic::Undefined(Undefined::DivisionByZero),
            (Some(prev), Some(next)) => Statistic::from_f64((next - prev) / prev * 100.0),
            _ => Statistic::Undefined(Undefined::MissingInput),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_basic_growth() {
        let rates = pct_change(&[Some(100.0), Some(150.0), Some(120.0)]);
        assert_eq!(rates.len(), 2);
        assert_relative_eq!(rates[0].value().unwrap(), 50.0);
        assert_relative_eq!(rates[1].value().unwrap(), -20.0);
    }

    #[test]
    fn test_zero_base_is_marked() {
        let rates = pct_change(&[Some(0.0), Some(10.0), Some(20.0)]);
        assert_eq!(rates[0], Statistic::Undefined(Undefined::DivisionByZero));
        assert_relative_eq!(rates[1].value().unwrap(), 100.0);
    }

    #[test]
    fn test_missing_is_marked() {
        let rates = pct_change(&[Some(10.0), None, Some(20.0)]);
        assert_eq!(rates, vec![Statistic::Undefined(Undefined::MissingInput); 2]);
    }

    #[test]
    fn test_single_period_yields_empty() {
        assert!(pct_change(&[Some(5.0)]).is_empty());
        assert!(pct_change(&[]).is_empty());
    }

    #[test]
    fn test_panel_growth_labels() {
        let panel = Panel::builder(vec![2000, 2001, 2002])
            .dense("Ireland", &[100.0, 150.0, 120.0])
            .unwrap()
            .dense("United States", &[10.0, 11.0, 12.1])
            .unwrap()
            .build()
            .unwrap();

        let result = growth_rates(&panel, true).unwrap();
        let ireland = result.value("Ireland").unwrap();
        assert_eq!(ireland.periods, vec![2001, 2002]);
        assert_eq!(ireland.rates.len(), panel.n_periods() - 1);

        let us = result.value("United States").unwrap();
        assert_relative_eq!(us.rates[0].value().unwrap(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(us.rates[1].value().unwrap(), 10.0, epsilon = 1e-9);
    }
}
