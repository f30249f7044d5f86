//! Command-line interface for econ-rs

mod export;
mod loader;
mod table;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use econ_stats::{AnalysisConfig, Panel, PanelAnalyzer, RegressionMode};
use econ_utils::Config;
use tracing::{info, warn};

/// Countries analysed when `--countries` is not given
const DEFAULT_COUNTRIES: [&str; 9] = [
    "United States",
    "China",
    "Russian Federation",
    "Germany",
    "France",
    "United Kingdom",
    "Japan",
    "Iran, Islamic Rep.",
    "Ireland",
];

#[derive(Parser, Debug)]
#[command(name = "econ", version)]
#[command(about = "Statistics over World Bank indicator panels", long_about = None)]
struct Cli {
    /// JSON application config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Process countries one at a time
    #[arg(long, global = true)]
    sequential: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Which rows and columns of the indicator files to analyse
#[derive(Args, Debug, Clone)]
struct Selection {
    /// Semicolon-separated country names
    #[arg(long, value_delimiter = ';')]
    countries: Option<Vec<String>>,

    /// First year (inclusive)
    #[arg(long, default_value_t = 2000)]
    start: i32,

    /// Last year (inclusive)
    #[arg(long, default_value_t = 2023)]
    end: i32,

    /// Metadata lines before the CSV header
    #[arg(long, default_value_t = loader::DEFAULT_SKIP_ROWS)]
    skip_rows: usize,
}

impl Selection {
    fn countries(&self) -> Vec<String> {
        self.countries.clone().unwrap_or_else(|| {
            DEFAULT_COUNTRIES.iter().map(ToString::to_string).collect()
        })
    }

    fn load(&self, path: &Path) -> Result<Panel> {
        let panel = loader::load_panel(path, self.skip_rows)?;
        panel
            .slice(&self.countries(), self.start, self.end)
            .with_context(|| format!("failed to select countries from {}", path.display()))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Per-country Pearson correlation between two indicators
    Correlate {
        #[arg(long)]
        x: PathBuf,
        #[arg(long)]
        y: PathBuf,
        #[command(flatten)]
        selection: Selection,
        /// Write CSV here instead of printing a table
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Per-country OLS of y on x
    Regress {
        #[arg(long)]
        x: PathBuf,
        #[arg(long)]
        y: PathBuf,
        /// Produce full inference reports
        #[arg(long)]
        full: bool,
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Year-over-year growth rates in percent
    Growth {
        #[arg(long)]
        data: PathBuf,
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Trailing-window summary statistics
    Rolling {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        window: Option<usize>,
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Additive trend, seasonal and residual decomposition
    Decompose {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        period: Option<usize>,
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run every analysis on a GDP and an inflation file and export the results
    Summary {
        #[arg(long)]
        gdp: PathBuf,
        #[arg(long)]
        inflation: PathBuf,
        #[command(flatten)]
        selection: Selection,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Config::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level.clone_from(level);
    }
    Ok(config)
}

fn analysis_config(cli: &Cli) -> Result<AnalysisConfig> {
    analysis_config_with(cli, |key| std::env::var(key).ok())
}

/// `ECON_*` values first, then explicit flags on top
fn analysis_config_with(cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::default().with_overrides(lookup)?;
    match &cli.command {
        Commands::Rolling { window: Some(window), .. } => config.rolling_window = *window,
        Commands::Decompose { period: Some(period), .. } => config.decomposition_period = *period,
        Commands::Regress { full: true, .. } => config.regression_mode = RegressionMode::Full,
        _ => {}
    }
    if cli.sequential {
        config.parallel = false;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    econ_utils::init_tracing(&config.log_level, config.log_format);

    let analysis = analysis_config(&cli)?;
    info!(app = %config.app_name, environment = %config.environment, ?analysis, "starting econ");
    let analyzer = PanelAnalyzer::new(Arc::new(analysis));

    match cli.command {
        Commands::Correlate { x, y, selection, output } => {
            let result = analyzer.correlation(&selection.load(&x)?, &selection.load(&y)?)?;
            match output {
                Some(path) => export::to_file(&path, |f| export::write_correlations(&result, f))?,
                None => println!("{}", table::correlations(&result)),
            }
        }
        Commands::Regress { x, y, selection, output, .. } => {
            let result = analyzer.regression(&selection.load(&x)?, &selection.load(&y)?)?;
            match output {
                Some(path) => export::to_file(&path, |f| export::write_regressions(&result, f))?,
                None if analyzer.config().regression_mode == RegressionMode::Full => {
                    export::write_regressions(&result, std::io::stdout().lock())?;
                }
                None => println!("{}", table::regressions(&result)),
            }
        }
        Commands::Growth { data, selection, output } => {
            let result = analyzer.growth_rates(&selection.load(&data)?)?;
            match output {
                Some(path) => export::to_file(&path, |f| export::write_growth_rates(&result, f))?,
                None => println!("{}", table::growth_rates(&result)),
            }
        }
        Commands::Rolling { data, selection, output, .. } => {
            let result = analyzer.rolling(&selection.load(&data)?)?;
            match output {
                Some(path) => export::to_file(&path, |f| export::write_rolling(&result, f))?,
                None => println!("{}", table::rolling(&result)),
            }
        }
        Commands::Decompose { data, selection, output, .. } => {
            let panel = selection.load(&data)?;
            let result = analyzer.decompose_batch(&panel, panel.entities())?;
            match output {
                Some(path) => export::to_file(&path, |f| export::write_decompositions(&result, f))?,
                None => println!("{}", table::decompositions(&result)),
            }
        }
        Commands::Summary { gdp, inflation, selection } => {
            let gdp = Arc::new(selection.load(&gdp)?);
            let inflation = Arc::new(selection.load(&inflation)?);
            run_summary(&analyzer, gdp, inflation, &config).await?;
        }
    }

    Ok(())
}

/// Run the analyzers concurrently on the blocking pool and export each result
async fn run_summary(
    analyzer: &PanelAnalyzer,
    gdp: Arc<Panel>,
    inflation: Arc<Panel>,
    config: &Config,
) -> Result<()> {
    let spawn = |task: fn(&PanelAnalyzer, &Panel, &Panel) -> econ_stats::Result<Output>| {
        let (analyzer, gdp, inflation) = (analyzer.clone(), Arc::clone(&gdp), Arc::clone(&inflation));
        tokio::task::spawn_blocking(move || task(&analyzer, &gdp, &inflation))
    };

    let (correlation, regression, growth, rolling, decomposition) = tokio::try_join!(
        spawn(|a, gdp, inflation| a.correlation(gdp, inflation).map(Output::Correlation)),
        spawn(|a, gdp, inflation| {
            a.regression_with(inflation, gdp, RegressionMode::Full).map(Output::Regression)
        }),
        spawn(|a, gdp, _| a.growth_rates(gdp).map(Output::Growth)),
        spawn(|a, gdp, _| a.rolling(gdp).map(Output::Rolling)),
        spawn(|a, gdp, _| a.decompose_batch(gdp, gdp.entities()).map(Output::Decomposition)),
    )
    .context("analysis task panicked")?;

    let dir = config.ensure_output_dir()?.to_path_buf();
    for output in [correlation?, regression?, growth?, rolling?, decomposition?] {
        let (name, failures) = output.export(config)?;
        if failures > 0 {
            warn!(analysis = name, failures, "some countries could not be analysed");
        }
    }

    info!(dir = %dir.display(), "summary exported");
    Ok(())
}

/// One finished analysis of the summary run
enum Output {
    Correlation(econ_stats::CorrelationResult),
    Regression(econ_stats::RegressionResult),
    Growth(econ_stats::GrowthRateResult),
    Rolling(econ_stats::RollingStatsResult),
    Decomposition(econ_stats::DecompositionResult),
}

impl Output {
    /// Write to its file in the output directory, returning the analysis name and failure count
    fn export(&self, config: &Config) -> Result<(&'static str, usize)> {
        match self {
            Self::Correlation(r) => {
                export::to_file(&config.output_path("correlation.csv"), |f| {
                    export::write_correlations(r, f)
                })?;
                Ok(("correlation", r.failures().count()))
            }
            Self::Regression(r) => {
                export::to_file(&config.output_path("regression.txt"), |f| {
                    export::write_regressions(r, f)
                })?;
                Ok(("regression", r.failures().count()))
            }
            Self::Growth(r) => {
                export::to_file(&config.output_path("growth_rates.csv"), |f| {
                    export::write_growth_rates(r, f)
                })?;
                Ok(("growth", r.failures().count()))
            }
            Self::Rolling(r) => {
                export::to_file(&config.output_path("rolling_stats.csv"), |f| {
                    export::write_rolling(r, f)
                })?;
                Ok(("rolling", r.failures().count()))
            }
            Self::Decomposition(r) => {
                export::to_file(&config.output_path("decomposition.csv"), |f| {
                    export::write_decompositions(r, f)
                })?;
                Ok(("decomposition", r.failures().count()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::try_parse_from(["econ", "growth", "--data", "gdp.csv"]).unwrap();
        let Commands::Growth { selection, output, .. } = &cli.command else {
            panic!("expected growth command");
        };
        assert_eq!(selection.start, 2000);
        assert_eq!(selection.end, 2023);
        assert_eq!(selection.countries().len(), DEFAULT_COUNTRIES.len());
        assert!(output.is_none());
    }

    #[test]
    fn test_countries_keep_commas() {
        let cli = Cli::try_parse_from([
            "econ",
            "correlate",
            "--x",
            "a.csv",
            "--y",
            "b.csv",
            "--countries",
            "Iran, Islamic Rep.;Ireland",
        ])
        .unwrap();
        let Commands::Correlate { selection, .. } = &cli.command else {
            panic!("expected correlate command");
        };
        assert_eq!(selection.countries(), vec!["Iran, Islamic Rep.", "Ireland"]);
    }

    #[test]
    fn test_flags_reach_analysis_config() {
        let cli = Cli::try_parse_from(["econ", "--sequential", "rolling", "--data", "d.csv", "--window", "5"])
            .unwrap();
        let config = analysis_config_with(&cli, |_| None).unwrap();
        assert_eq!(config.rolling_window, 5);
        assert!(!config.parallel);

        let cli = Cli::try_parse_from(["econ", "regress", "--x", "a", "--y", "b", "--full"]).unwrap();
        assert_eq!(
            analysis_config_with(&cli, |_| None).unwrap().regression_mode,
            RegressionMode::Full
        );
    }

    #[test]
    fn test_flags_override_environment() {
        let env = |key: &str| match key {
            econ_stats::config::ENV_ROLLING_WINDOW => Some("5".to_string()),
            econ_stats::config::ENV_PARALLEL => Some("false".to_string()),
            _ => None,
        };

        let cli = Cli::try_parse_from(["econ", "rolling", "--data", "d.csv", "--window", "2"]).unwrap();
        let config = analysis_config_with(&cli, env).unwrap();
        assert_eq!(config.rolling_window, 2);
        assert!(!config.parallel);

        let cli = Cli::try_parse_from(["econ", "rolling", "--data", "d.csv"]).unwrap();
        assert_eq!(analysis_config_with(&cli, env).unwrap().rolling_window, 5);
    }

    #[test]
    fn test_summary_output_lands_in_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_dir: dir.path().join("summary"),
            ..Config::default()
        };
        let panel = Panel::builder(vec![2000, 2001, 2002])
            .dense("Ireland", &[100.0, 150.0, 120.0])
            .unwrap()
            .build()
            .unwrap();
        let growth = PanelAnalyzer::default().growth_rates(&panel).unwrap();

        let (name, failures) = Output::Growth(growth).export(&config).unwrap();
        assert_eq!((name, failures), ("growth", 0));
        let text = std::fs::read_to_string(config.output_path("growth_rates.csv")).unwrap();
        assert!(text.starts_with("Country Name,Year,Growth Rate"));
    }

    #[test]
    fn test_zero_window_rejected() {
        let cli = Cli::try_parse_from(["econ", "rolling", "--data", "d.csv", "--window", "0"]).unwrap();
        assert!(analysis_config_with(&cli, |_| None).is_err());
    }
}
