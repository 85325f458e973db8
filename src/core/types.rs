use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::core::RiskError;

/// Default confidence level for VaR and ES.
pub const DEFAULT_CONFIDENCE: f64 = 0.99;

/// Panel of per-asset log-returns.
///
/// Rows are observations ordered oldest to newest, columns are assets. A valid panel
/// always has at least two rows, at least one column and only finite entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMatrix {
    data: DMatrix<f64>,
}

impl ReturnMatrix {
    /// Builds a panel from observation rows, each holding one return per asset.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, RiskError> {
        let n_assets = rows.first().map_or(0, Vec::len);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != n_assets {
                return Err(RiskError::RaggedRows {
                    row,
                    expected: n_assets,
                    actual: values.len(),
                });
            }
        }
        Self::validated(DMatrix::from_fn(rows.len(), n_assets, |i, j| rows[i][j]))
    }

    /// Builds a panel from per-asset return series of equal length.
    ///
    /// Series of different lengths are rejected rather than truncated.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self, RiskError> {
        let n_obs = columns.first().map_or(0, Vec::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_obs) {
            return Err(RiskError::ShapeMismatch {
                expected: n_obs,
                actual: bad.len(),
            });
        }
        Self::validated(DMatrix::from_fn(n_obs, columns.len(), |i, j| columns[j][i]))
    }

    /// Builds a panel from a row-major slice.
    pub fn from_row_slice(
        n_observations: usize,
        n_assets: usize,
        values: &[f64],
    ) -> Result<Self, RiskError> {
        if values.len() != n_observations * n_assets {
            return Err(RiskError::ShapeMismatch {
                expected: n_observations * n_assets,
                actual: values.len(),
            });
        }
        Self::validated(DMatrix::from_row_slice(n_observations, n_assets, values))
    }

    /// Wraps an existing `nalgebra` matrix after validation.
    pub fn from_matrix(data: DMatrix<f64>) -> Result<Self, RiskError> {
        Self::validated(data)
    }

    fn validated(data: DMatrix<f64>) -> Result<Self, RiskError> {
        if data.ncols() == 0 {
            return Err(RiskError::NoAssets);
        }
        if data.nrows() < 2 {
            return Err(RiskError::InsufficientData {
                observations: data.nrows(),
            });
        }
        for j in 0..data.ncols() {
            for i in 0..data.nrows() {
                if !data[(i, j)].is_finite() {
                    return Err(RiskError::NonFiniteInput { row: i, column: j });
                }
            }
        }
        Ok(Self { data })
    }

    /// Number of observations `N`.
    pub fn n_observations(&self) -> usize {
        self.data.nrows()
    }

    /// Number of assets `A`.
    pub fn n_assets(&self) -> usize {
        self.data.ncols()
    }

    /// Return series of one asset, oldest first.
    pub fn column(&self, asset: usize) -> Vec<f64> {
        self.data.column(asset).iter().copied().collect()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }
}

/// Portfolio exposures, one per asset, in currency units.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightVector {
    data: DVector<f64>,
}

impl WeightVector {
    pub fn new(weights: Vec<f64>) -> Result<Self, RiskError> {
        if weights.is_empty() {
            return Err(RiskError::NoAssets);
        }
        if let Some(column) = weights.iter().position(|w| !w.is_finite()) {
            return Err(RiskError::NonFiniteInput { row: 0, column });
        }
        Ok(Self {
            data: DVector::from_vec(weights),
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a copy with every exposure multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            data: &self.data * factor,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        self.data.as_slice()
    }

    pub fn as_vector(&self) -> &DVector<f64> {
        &self.data
    }
}

impl TryFrom<&[f64]> for WeightVector {
    type Error = RiskError;

    fn try_from(weights: &[f64]) -> Result<Self, Self::Error> {
        Self::new(weights.to_vec())
    }
}

/// Confidence level `alpha`, strictly inside `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    pub fn new(alpha: f64) -> Result<Self, RiskError> {
        // Written as a negated conjunction so NaN is rejected too.
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(RiskError::InvalidConfidence(alpha));
        }
        Ok(Self(alpha))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Tail probability `1 - alpha`.
    pub fn tail_probability(self) -> f64 {
        1.0 - self.0
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self(DEFAULT_CONFIDENCE)
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = RiskError;

    fn try_from(alpha: f64) -> Result<Self, Self::Error> {
        Self::new(alpha)
    }
}

/// Value-at-Risk and Expected Shortfall in the units of the weight vector.
///
/// Both numbers use a loss-positive convention: a positive VaR is a loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub var: f64,
    pub es: f64,
}

impl RiskResult {
    /// `(VaR, ES)` as an ordered pair.
    pub fn into_pair(self) -> (f64, f64) {
        (self.var, self.es)
    }
}
