//! Terminal tables for analysis results

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use econ_stats::{
    CorrelationResult, DecompositionResult, GrowthRateResult, RegressionResult,
    RollingStatsResult, Statistic,
};

fn new_table<const N: usize>(header: [&str; N]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn number(stat: Statistic) -> Cell {
    Cell::new(format!("{stat:.4}")).set_alignment(CellAlignment::Right)
}

pub fn correlations(result: &CorrelationResult) -> Table {
    let mut table = new_table(["Country", "Correlation"]);
    for (entity, outcome) in result.iter() {
        let value = match outcome {
            Ok(stat) => number(*stat),
            Err(e) => Cell::new(e.to_string()),
        };
        table.add_row(vec![Cell::new(entity), value]);
    }
    table
}

/// Periods as columns, entities as rows
pub fn growth_rates(result: &GrowthRateResult) -> Table {
    let periods = result
        .successes()
        .next()
        .map(|(_, s)| s.periods.clone())
        .unwrap_or_default();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec![Cell::new("Country")];
    header.extend(periods.iter().map(Cell::new));
    table.set_header(header);

    for (entity, series) in result.successes() {
        let mut row = vec![Cell::new(entity)];
        row.extend(series.rates.iter().map(|r| number(*r)));
        table.add_row(row);
    }
    table
}

pub fn rolling(result: &RollingStatsResult) -> Table {
    let mut table = new_table(["Country", "Year", "Mean", "Std", "Median", "Variance", "Skew", "Kurtosis"]);
    for row in result.rows() {
        table.add_row(vec![
            Cell::new(&row.entity),
            Cell::new(row.period),
            number(row.mean),
            number(row.std),
            number(row.median),
            number(row.variance),
            number(row.skew),
            number(row.kurtosis),
        ]);
    }
    table
}

pub fn regressions(result: &RegressionResult) -> Table {
    let mut table = new_table(["Country", "Slope", "Intercept", "R-squared", "MSE", "N"]);
    for (entity, outcome) in result.iter() {
        match outcome {
            Ok(output) => {
                let d = output.diagnostics();
                table.add_row(vec![
                    Cell::new(entity),
                    number(d.slope.into()),
                    number(d.intercept.into()),
                    number(d.r_squared),
                    number(d.mse.into()),
                    Cell::new(d.n_obs),
                ]);
            }
            Err(e) => {
                table.add_row(vec![Cell::new(entity), Cell::new(e.to_string())]);
            }
        }
    }
    table
}

pub fn decompositions(result: &DecompositionResult) -> Table {
    let mut table = new_table(["Country", "Year", "Observed", "Trend", "Seasonal", "Residual"]);
    for (entity, outcome) in result.iter() {
        let d = match outcome {
            Ok(d) => d,
            Err(e) => {
                table.add_row(vec![Cell::new(entity), Cell::new(e.to_string())]);
                continue;
            }
        };
        for i in 0..d.len() {
            table.add_row(vec![
                Cell::new(entity),
                Cell::new(d.periods[i]),
                number(d.observed[i].into()),
                number(d.trend[i]),
                number(d.seasonal[i].into()),
                number(d.residual[i]),
            ]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use econ_stats::{Panel, PanelAnalyzer};

    #[test]
    fn test_correlation_table_shows_nan_and_errors() {
        let a = Panel::builder(vec![2000, 2001, 2002])
            .dense("Ireland", &[1.0, 2.0, 3.0])
            .unwrap()
            .dense("Japan", &[4.0, 4.0, 4.0])
            .unwrap()
            .build()
            .unwrap();
        let result = PanelAnalyzer::default().correlation(&a, &a).unwrap();
        let rendered = correlations(&result).to_string();

        assert!(rendered.contains("Ireland"));
        assert!(rendered.contains("1.0000"));
        assert!(rendered.contains("nan"));
    }

    #[test]
    fn test_growth_table_has_period_columns() {
        let a = Panel::builder(vec![2000, 2001, 2002])
            .dense("Ireland", &[100.0, 150.0, 120.0])
            .unwrap()
            .build()
            .unwrap();
        let result = PanelAnalyzer::default().growth_rates(&a).unwrap();
        let rendered = growth_rates(&result).to_string();

        assert!(rendered.contains("2001"));
        assert!(rendered.contains("50.0000"));
        assert!(rendered.contains("-20.0000"));
    }
}
