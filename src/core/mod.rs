//! Core data model, configuration, and library-wide error structures.

pub mod config;
pub mod types;

pub use config::EstimatorConfig;
pub use types::*;

/// Estimation and validation errors surfaced by the API.
///
/// Every variant is raised before any risk number is produced; a call either
/// returns both VaR and ES or fails with one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiskError {
    /// Weight vector length differs from the number of asset columns.
    #[error("shape mismatch: expected {expected} assets, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    /// Confidence level outside the open interval `(0, 1)`.
    #[error("invalid confidence level {0}: must lie in (0, 1)")]
    InvalidConfidence(f64),
    /// Fewer than two observations; the unbiased covariance is undefined.
    #[error("insufficient data: {observations} observation(s), at least 2 required")]
    InsufficientData { observations: usize },
    /// Return panel has no asset columns.
    #[error("return matrix has no asset columns")]
    NoAssets,
    /// A row of a row-major panel has a different width than the first row.
    #[error("ragged return rows: row {row} has {actual} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// NaN or infinite value in returns or weights.
    #[error("non-finite input at row {row}, column {column}")]
    NonFiniteInput { row: usize, column: usize },
    /// More assets than observations while the configuration rejects singular fits.
    #[error(
        "ill-conditioned covariance: {assets} assets from {observations} observations is singular"
    )]
    IllConditionedCovariance { assets: usize, observations: usize },
    /// Configuration value out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
