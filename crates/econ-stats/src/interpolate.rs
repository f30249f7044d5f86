//! Gap filling for series with missing observations

/// Fill missing values by linear interpolation over positions.
///
/// Leading and trailing gaps take the nearest observed value. Returns
/// `None` when nothing is observed.
pub fn linear_fill(series: &[Option<f64>]) -> Option<Vec<f64>> {
    let observed: Vec<(usize, f64)> = series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|x| (i, x)))
        .collect();

    let (&(first_idx, first_val), &(last_idx, last_val)) =
        (observed.first()?, observed.last()?);

    let mut filled = Vec::with_capacity(series.len());
    let mut segment = 0;
    for (i, cell) in series.iter().enumerate() {
        let value = if let Some(v) = *cell {
            v
        } else if i < first_idx {
            first_val
        } else if i > last_idx {
            last_val
        } else {
            while observed[segment + 1].0 < i {
                segment += 1;
            }
            let (x0, y0) = observed[segment];
            let (x1, y1) = observed[segment + 1];
            let t = (i - x0) as f64 / (x1 - x0) as f64;
            y0 + t * (y1 - y0)
        };
        filled.push(value);
    }

    Some(filled)
}
