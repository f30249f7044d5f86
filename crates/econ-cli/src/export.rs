//! CSV and text export of analysis results

use anyhow::{Context, Result};
use econ_stats::{
    CorrelationResult, DecompositionResult, GrowthRateResult, RegressionOutput, RegressionReport,
    RegressionResult, RollingStatsResult, Statistic,
};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Undefined statistics export as empty cells
fn cell(stat: Statistic) -> String {
    stat.value().map_or_else(String::new, |v| v.to_string())
}

pub fn write_correlations<W: Write>(result: &CorrelationResult, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["Country Name", "Correlation Coefficient"])?;
    for (entity, outcome) in result.iter() {
        let value = outcome.as_ref().map_or_else(|_| String::new(), |s| cell(*s));
        wtr.write_record([entity.as_str(), value.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Long format: one row per entity and period
pub fn write_growth_rates<W: Write>(result: &GrowthRateResult, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["Country Name", "Year", "Growth Rate"])?;
    for (entity, series) in result.successes() {
        for (period, rate) in series.periods.iter().zip(&series.rates) {
            wtr.write_record([entity.to_string(), period.to_string(), cell(*rate)])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_rolling<W: Write>(result: &RollingStatsResult, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "Country", "Year", "Mean", "Std", "Median", "Variance", "Skew", "Kurtosis",
    ])?;
    for row in result.rows() {
        wtr.write_record([
            row.entity.to_string(),
            row.period.to_string(),
            cell(row.mean),
            cell(row.std),
            cell(row.median),
            cell(row.variance),
            cell(row.skew),
            cell(row.kurtosis),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_decompositions<W: Write>(result: &DecompositionResult, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["Country Name", "Year", "Observed", "Trend", "Seasonal", "Residual"])?;
    for (entity, d) in result.successes() {
        for i in 0..d.len() {
            wtr.write_record([
                entity.to_string(),
                d.periods[i].to_string(),
                d.observed[i].to_string(),
                cell(d.trend[i]),
                d.seasonal[i].to_string(),
                cell(d.residual[i]),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

const RULE_WIDTH: usize = 78;

/// statsmodels-style summary table of one report
pub fn render_report(report: &RegressionReport) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{:^width$}", "OLS Regression Results", width = RULE_WIDTH);
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "{:<14}{:>24}   {:<20}{:>17}", "Entity:", report.entity, "R-squared:", format!("{:.3}", report.r_squared));
    let _ = writeln!(out, "{:<14}{:>24}   {:<20}{:>17}", "Model:", "OLS", "Adj. R-squared:", format!("{:.3}", report.adj_r_squared));
    let _ = writeln!(out, "{:<14}{:>24}   {:<20}{:>17}", "Method:", "Least Squares", "F-statistic:", format!("{:.4}", report.f_statistic));
    let _ = writeln!(out, "{:<14}{:>24}   {:<20}{:>17}", "No. Obs.:", report.n_obs, "Prob (F-statistic):", format!("{:.4}", report.f_p_value));
    let _ = writeln!(out, "{:<14}{:>24}   {:<20}{:>17}", "Df Residuals:", report.df_resid, "Log-Likelihood:", format!("{:.3}", report.log_likelihood));
    let _ = writeln!(out, "{:<14}{:>24}   {:<20}{:>17}", "Df Model:", report.df_model, "AIC:", format!("{:.3}", report.aic));
    let _ = writeln!(out, "{:<14}{:>24}   {:<20}{:>17}", "MSE:", format!("{:.4}", report.mse), "BIC:", format!("{:.3}", report.bic));
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(
        out,
        "{:<8}{:>12}{:>12}{:>10}{:>10}{:>13}{:>13}",
        "", "coef", "std err", "t", "P>|t|", "[0.025", "0.975]"
    );
    let _ = writeln!(out, "{light}");
    for c in &report.coefficients {
        let _ = writeln!(
            out,
            "{:<8}{:>12.4}{:>12}{:>10}{:>10}{:>13}{:>13}",
            c.name,
            c.estimate,
            format!("{:.3}", c.std_err),
            format!("{:.3}", c.t_value),
            format!("{:.3}", c.p_value),
            format!("{:.3}", c.ci_lower),
            format!("{:.3}", c.ci_upper),
        );
    }
    let _ = writeln!(out, "{heavy}");
    out
}

/// Plain-text regression summaries, one block per entity
pub fn write_regressions<W: Write>(result: &RegressionResult, mut out: W) -> Result<()> {
    for (entity, outcome) in result.iter() {
        match outcome {
            Ok(RegressionOutput::Report(report)) => {
                writeln!(out, "Country: {entity}")?;
                writeln!(out, "{}", render_report(report))?;
            }
            Ok(RegressionOutput::Diagnostics(d)) => {
                writeln!(out, "Country: {entity}")?;
                writeln!(out, "  slope:      {:.6}", d.slope)?;
                writeln!(out, "  intercept:  {:.6}", d.intercept)?;
                writeln!(out, "  r_squared:  {:.6}", d.r_squared)?;
                writeln!(out, "  mse:        {:.6}", d.mse)?;
                writeln!(out, "  n_obs:      {}", d.n_obs)?;
            }
            Err(e) => writeln!(out, "Country: {entity}\n  failed: {e}")?,
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Create `path` and hand it to one of the writers above
pub fn to_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write(file)?;
    info!(path = %path.display(), "exported results");
    Ok(())
}
