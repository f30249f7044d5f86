//! Per-entity Pearson correlation between two indicator panels

use crate::batch::{BatchResult, run_per_entity};
use crate::error::Result;
use crate::panel::Panel;
use crate::statistic::{Statistic, Undefined};

/// One coefficient per entity, or an undefined marker
pub type CorrelationResult = BatchResult<Statistic>;

/// Correlate each entity's series in `a` with its series in `b` across periods.
///
/// Both panels must hold the same entities and the same periods. Only
/// periods observed in both series contribute.
pub fn correlate(a: &Panel, b: &Panel, parallel: bool) -> Result<CorrelationResult> {
    a.ensure_aligned(b)?;

    let mut items = Vec::with_capacity(a.n_entities());
    for (key, left) in a.iter() {
        items.push((key.clone(), (left, b.series(key.as_str())?)));
    }

    Ok(run_per_entity(items, parallel, |_, (left, right)| {
        Ok(pearson(left, right))
    }))
}

/// Pearson correlation over pairwise-complete observations
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Statistic {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    if pairs.len() < 2 {
        return Statistic::Undefined(Undefined::InsufficientObservations);
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Statistic::Undefined(Undefined::ZeroVariance);
    }

    Statistic::from_f64(sxy / (sxx.sqrt() * syy.sqrt())).map(|r| r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatsError;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn dense(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_perfect_correlation() {
        let r = pearson(&dense(&[1.0, 2.0, 3.0]), &dense(&[2.0, 4.0, 6.0]));
        assert_relative_eq!(r.value().unwrap(), 1.0, epsilon = 1e-12);

        let r = pearson(&dense(&[1.0, 2.0, 3.0]), &dense(&[3.0, 2.0, 1.0]));
        assert_relative_eq!(r.value().unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_variance_is_undefined() {
        let r = pearson(&dense(&[5.0, 5.0, 5.0]), &dense(&[1.0, 2.0, 3.0]));
        assert_eq!(r, Statistic::Undefined(Undefined::ZeroVariance));
    }

    #[test]
    fn test_missing_pairs_are_skipped() {
        let x = vec![Some(1.0), None, Some(3.0), Some(4.0)];
        let y = vec![Some(2.0), Some(100.0), Some(6.0), Some(8.0)];
        let r = pearson(&x, &y);
        assert_relative_eq!(r.value().unwrap(), 1.0, epsilon = 1e-12);

        let r = pearson(&[Some(1.0), None], &[None, Some(2.0)]);
        assert_eq!(r, Statistic::Undefined(Undefined::InsufficientObservations));
    }

    #[test]
    fn test_panel_correlation() {
        let gdp = Panel::builder(vec![2000, 2001, 2002, 2003])
            .dense("Germany", &[1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .dense("Japan", &[4.0, 4.0, 4.0, 4.0])
            .unwrap()
            .build()
            .unwrap();
        let inflation = Panel::builder(vec![2000, 2001, 2002, 2003])
            .dense("Japan", &[0.1, 0.2, 0.3, 0.1])
            .unwrap()
            .dense("Germany", &[1.5, 1.0, 0.5, 0.0])
            .unwrap()
            .build()
            .unwrap();

        let result = correlate(&gdp, &inflation, true).unwrap();
        assert_eq!(result.len(), 2);
        assert_relative_eq!(
            result.value("Germany").unwrap().value().unwrap(),
            -1.0,
            epsilon = 1e-12
        );
        assert_eq!(
            result.value("Japan"),
            Some(&Statistic::Undefined(Undefined::ZeroVariance))
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Panel::builder(vec![2000, 2001])
            .dense("France", &[1.0, 2.0])
            .unwrap()
            .build()
            .unwrap();
        let b = Panel::builder(vec![2000, 2001])
            .dense("Spain", &[1.0, 2.0])
            .unwrap()
            .build()
            .unwrap();
        assert!(matches!(
            correlate(&a, &b, false),
            Err(StatsError::ShapeMismatch(_))
        ));

        let c = Panel::builder(vec![2000, 2001, 2002])
            .dense("France", &[1.0, 2.0, 3.0])
            .unwrap()
            .build()
            .unwrap();
        assert!(matches!(
            correlate(&a, &c, false),
            Err(StatsError::ShapeMismatch(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_bounded_and_symmetric(
            xs in prop::collection::vec(-1.0e6f64..1.0e6, 2..40),
            seed in prop::collection::vec(-1.0e6f64..1.0e6, 40),
        ) {
            let x = dense(&xs);
            let y = dense(&seed[..xs.len()]);
            let ab = pearson(&x, &y);
            let ba = pearson(&y, &x);

            prop_assert_eq!(ab.is_defined(), ba.is_defined());
            if let (Some(r1), Some(r2)) = (ab.value(), ba.value()) {
                prop_assert!((-1.0..=1.0).contains(&r1));
                prop_assert!((r1 - r2).abs() < 1e-12);
            }
        }
    }
}
