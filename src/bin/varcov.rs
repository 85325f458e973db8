//! Command-line entry point for variance-covariance VaR/ES.
//!
//! Loads one closing-price file per asset, converts prices to log returns, fits the
//! sample moments and prints VaR and ES for the given exposures.
//!
//! Usage:
//! ```bash
//! varcov --prices BMW.csv --prices VW.csv --prices CON.csv --weights 90,70,50 --alpha 0.99
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use varferric::core::{EstimatorConfig, WeightVector};
use varferric::market::{PriceFileFormat, SeriesOrder, load_return_matrix};
use varferric::risk::VarCovEstimator;

#[derive(Parser)]
#[command(name = "varcov")]
#[command(
    version,
    about = "Parametric variance-covariance VaR and Expected Shortfall",
    long_about = None
)]
struct Cli {
    /// Price file per asset, in the same order as the weights
    #[arg(short, long = "prices", required = true)]
    prices: Vec<PathBuf>,

    /// Exposure per asset, comma separated (e.g. 90,70,50)
    #[arg(short, long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    weights: Vec<f64>,

    /// Confidence level in (0, 1); overrides the config file
    #[arg(short, long)]
    alpha: Option<f64>,

    /// JSON estimator configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Field delimiter of the price files
    #[arg(long, default_value = ";")]
    delimiter: char,

    /// Header of the closing-price column
    #[arg(long, default_value = "Schlusskurs")]
    column: String,

    /// Price files list the oldest close first
    #[arg(long)]
    oldest_first: bool,

    /// Parse prices with a decimal point only
    #[arg(long)]
    no_decimal_comma: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => EstimatorConfig::from_json_file(path)?,
        None => EstimatorConfig::default(),
    };
    if let Some(alpha) = cli.alpha {
        config.confidence = alpha;
    }
    let estimator = VarCovEstimator::new(config)?;

    if !cli.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got {:?}", cli.delimiter);
    }
    let format = PriceFileFormat {
        delimiter: cli.delimiter as u8,
        price_column: cli.column.clone(),
        order: if cli.oldest_first {
            SeriesOrder::OldestFirst
        } else {
            SeriesOrder::NewestFirst
        },
        decimal_comma: !cli.no_decimal_comma,
    };

    let returns = load_return_matrix(&cli.prices, &format).context("loading price files")?;
    let weights = WeightVector::new(cli.weights.clone())?;
    let fit = estimator.estimate(&returns, &weights)?;
    info!(
        alpha = estimator.config().confidence,
        rank_deficient = fit.model.is_rank_deficient(),
        "fit complete"
    );

    if cli.json {
        let out = json!({
            "alpha": estimator.config().confidence,
            "weights": weights.as_slice(),
            "var": fit.risk.var,
            "es": fit.risk.es,
            "model": fit.model.snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("weights: {:?}", weights.as_slice());
        println!("alpha:   {}", estimator.config().confidence);
        println!("VaR:     {:.6}", fit.risk.var);
        println!("ES:      {:.6}", fit.risk.es);
    }

    Ok(())
}
