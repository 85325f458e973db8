//! VarFerric estimates portfolio Value-at-Risk (VaR) and Expected Shortfall (ES) with the
//! parametric variance-covariance method.
//!
//! Asset log-returns are assumed jointly normal and the portfolio loss is linear in the
//! exposures. A fit computes the sample mean vector and unbiased sample covariance of a
//! return panel, then maps a weight vector through the normal loss model:
//!
//! - `VaR_alpha = -w'mu + sqrt(w'Sigma w) * Phi^{-1}(alpha)`
//! - `ES_alpha  = -w'mu + sqrt(w'Sigma w) * phi(Phi^{-1}(alpha)) / (1 - alpha)`
//!
//! Modules:
//! - `core`: validated inputs (`ReturnMatrix`, `WeightVector`, `ConfidenceLevel`), results,
//!   configuration and the `RiskError` taxonomy,
//! - `math`: standard-normal functions and sample moments,
//! - `risk`: the `VarCovEstimator` and its `FittedModel`,
//! - `market`: price-file loading and log-return panels.
//!
//! Out of scope: historical-simulation and Monte Carlo VaR, fat tails, horizon scaling,
//! backtesting and component/marginal VaR.
//!
//! # Feature Flags
//! - `parallel`: evaluates many portfolios against one fit with Rayon.
//! - `cli`: builds the `varcov` binary (clap, anyhow, tracing-subscriber).
//!
//! # Quick Start
//! ```rust
//! use varferric::core::{ReturnMatrix, WeightVector};
//! use varferric::risk::VarCovEstimator;
//!
//! let returns = ReturnMatrix::from_rows(&[
//!     vec![0.010, 0.020, -0.010],
//!     vec![-0.020, 0.010, 0.005],
//!     vec![0.015, -0.010, 0.000],
//!     vec![-0.005, 0.000, 0.010],
//! ])
//! .unwrap();
//! let weights = WeightVector::new(vec![90.0, 70.0, 50.0]).unwrap();
//!
//! let fit = VarCovEstimator::default().fit(&returns, &weights, 0.99).unwrap();
//! let (var, es) = fit.risk.into_pair();
//! assert!(es >= var);
//! assert_eq!(fit.model.covariance(), &fit.model.covariance().transpose());
//! ```
//!
//! Build returns from price levels:
//! ```rust
//! use varferric::market::{align_returns, log_returns};
//!
//! let a = log_returns(&[100.0, 101.0, 99.5, 100.2]).unwrap();
//! let b = log_returns(&[50.0, 50.5, 50.1, 49.8]).unwrap();
//! let panel = align_returns(&[a, b]).unwrap();
//! assert_eq!(panel.n_observations(), 3);
//! ```

pub mod core;
pub mod market;
pub mod math;
pub mod risk;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::market::{PriceFileFormat, load_return_matrix, log_returns};
    pub use crate::risk::*;
}
