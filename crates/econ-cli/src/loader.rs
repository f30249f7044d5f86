//! World Bank indicator CSV ingestion

use anyhow::{Context, Result, bail};
use econ_stats::Panel;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Metadata lines preceding the header in World Bank downloads
pub const DEFAULT_SKIP_ROWS: usize = 4;

/// Column holding the entity key
pub const COUNTRY_COLUMN: &str = "Country Name";

/// Load an indicator file into a panel
pub fn load_panel(path: &Path, skip_rows: usize) -> Result<Panel> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let panel = read_panel(BufReader::new(file), skip_rows)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    info!(
        path = %path.display(),
        entities = panel.n_entities(),
        periods = panel.n_periods(),
        "loaded indicator panel"
    );
    Ok(panel)
}

/// Parse an indicator table after skipping `skip_rows` preamble lines.
///
/// Year columns are every header that parses as an integer. Cells that are
/// empty or non-numeric become missing values, and rows with no observed
/// year at all are dropped.
pub fn read_panel<R: BufRead>(mut reader: R, skip_rows: usize) -> Result<Panel> {
    let mut line = String::new();
    for _ in 0..skip_rows {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            bail!("input ended inside the {skip_rows}-line preamble");
        }
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("failed to read CSV headers")?.clone();
    let Some(key_column) = headers.iter().position(|h| h.trim() == COUNTRY_COLUMN) else {
        bail!("missing '{COUNTRY_COLUMN}' column");
    };

    let mut year_columns: Vec<(usize, i32)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| {
            let h = h.trim();
            if h.is_empty() || !h.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            h.parse::<i32>().ok().map(|year| (i, year))
        })
        .collect();
    year_columns.sort_by_key(|&(_, year)| year);
    if year_columns.is_empty() {
        bail!("no year columns found in header");
    }

    let periods: Vec<i32> = year_columns.iter().map(|&(_, year)| year).collect();
    let mut builder = Panel::builder(periods);
    let mut dropped = 0usize;

    for record in rdr.records() {
        let record = record.context("malformed CSV record")?;
        let Some(name) = record.get(key_column).map(str::trim).filter(|n| !n.is_empty()) else {
            dropped += 1;
            continue;
        };

        let values: Vec<Option<f64>> = year_columns
            .iter()
            .map(|&(i, _)| record.get(i).and_then(parse_cell))
            .collect();
        if values.iter().all(Option::is_none) {
            dropped += 1;
            continue;
        }

        builder = builder.entity(name, values)?;
    }

    debug!(dropped, "dropped rows without observations");
    Ok(builder.build()?)
}

fn parse_cell(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
