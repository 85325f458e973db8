//! Closing-price files and their conversion to log-return panels.
//!
//! Each asset lives in its own delimited text file with a header row. Only one price
//! column is read. Exports from European data vendors typically use `;` as delimiter,
//! a decimal comma and newest-first ordering; [`PriceFileFormat::default`] matches
//! that layout.
//!
//! Series are always returned oldest-first, so `log_returns` is a plain forward
//! difference of log prices.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{ReturnMatrix, RiskError};

/// Row ordering of a price file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrder {
    /// First data row is the most recent close.
    NewestFirst,
    /// First data row is the oldest close.
    OldestFirst,
}

/// Layout of a price file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceFileFormat {
    pub delimiter: u8,
    /// Header name of the closing-price column.
    pub price_column: String,
    pub order: SeriesOrder,
    /// Accept `1.234,56` style numbers.
    pub decimal_comma: bool,
}

impl Default for PriceFileFormat {
    fn default() -> Self {
        Self {
            delimiter: b';',
            price_column: "Schlusskurs".to_string(),
            order: SeriesOrder::NewestFirst,
            decimal_comma: true,
        }
    }
}

/// Errors raised while loading prices or turning them into returns.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("price column `{0}` not found in header")]
    MissingColumn(String),
    #[error("line {line}: invalid price `{value}`")]
    InvalidPrice { line: usize, value: String },
    #[error("price at index {index} must be finite and > 0, got {value}")]
    NonPositivePrice { index: usize, value: f64 },
    #[error("need at least 2 prices to form a return, got {count}")]
    TooFewPrices { count: usize },
    #[error(transparent)]
    Risk(#[from] RiskError),
}

/// Reads a price series from any reader, returning prices oldest-first.
pub fn read_price_series<R: Read>(
    reader: R,
    format: &PriceFileFormat,
) -> Result<Vec<f64>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(format.delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let column = rdr
        .headers()?
        .iter()
        .position(|h| h == format.price_column)
        .ok_or_else(|| DataError::MissingColumn(format.price_column.clone()))?;

    let mut prices = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let line = i + 2;
        let cell = record.get(column).unwrap_or_default();
        let price = parse_price(cell, format.decimal_comma).ok_or_else(|| {
            DataError::InvalidPrice {
                line,
                value: cell.to_string(),
            }
        })?;
        if !(price.is_finite() && price > 0.0) {
            return Err(DataError::InvalidPrice {
                line,
                value: cell.to_string(),
            });
        }
        prices.push(price);
    }

    if format.order == SeriesOrder::NewestFirst {
        prices.reverse();
    }
    Ok(prices)
}

/// Loads a price series from a file, returning prices oldest-first.
pub fn load_price_series(
    path: impl AsRef<Path>,
    format: &PriceFileFormat,
) -> Result<Vec<f64>, DataError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let prices = read_price_series(file, format)?;
    debug!(path = %path.display(), count = prices.len(), "loaded price series");
    Ok(prices)
}

/// Log returns `r_t = ln(P_t / P_{t-1})` of an oldest-first price series.
pub fn log_returns(prices: &[f64]) -> Result<Vec<f64>, DataError> {
    if prices.len() < 2 {
        return Err(DataError::TooFewPrices {
            count: prices.len(),
        });
    }
    if let Some((index, &value)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !(p.is_finite() && **p > 0.0))
    {
        return Err(DataError::NonPositivePrice { index, value });
    }
    Ok(prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

/// Stacks per-asset return series into an `N x A` panel.
///
/// Series must already be aligned on the same dates; unequal lengths are rejected.
pub fn align_returns(series: &[Vec<f64>]) -> Result<ReturnMatrix, RiskError> {
    ReturnMatrix::from_columns(series)
}

/// Loads one price file per asset and builds the log-return panel.
pub fn load_return_matrix<P: AsRef<Path>>(
    paths: &[P],
    format: &PriceFileFormat,
) -> Result<ReturnMatrix, DataError> {
    let series = paths
        .iter()
        .map(|p| load_price_series(p, format).and_then(|prices| log_returns(&prices)))
        .collect::<Result<Vec<_>, _>>()?;
    let returns = align_returns(&series)?;
    info!(
        assets = returns.n_assets(),
        observations = returns.n_observations(),
        "built log-return panel"
    );
    Ok(returns)
}

fn parse_price(cell: &str, decimal_comma: bool) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if !decimal_comma {
        return cell.parse().ok();
    }

    // `.` only ever groups thousands here, so `1.250` is 1250 and `12.34` is rejected.
    let (int_part, frac_part) = match cell.split_once(',') {
        Some((i, f)) => (i, Some(f)),
        None => (cell, None),
    };
    let digits = int_part.strip_prefix(['-', '+']).unwrap_or(int_part);
    if digits.contains('.') {
        let mut groups = digits.split('.');
        let lead = groups.next().unwrap_or_default();
        let lead_ok = (1..=3).contains(&lead.len());
        if !lead_ok || groups.any(|g| g.len() != 3) {
            return None;
        }
    }
    let mut normalized = int_part.replace('.', "");
    if let Some(frac) = frac_part {
        normalized.push('.');
        normalized.push_str(frac);
    }
    normalized.parse().ok()
}
