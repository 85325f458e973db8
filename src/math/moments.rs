//! Sample moments of a return panel.
//!
//! All estimators work column-wise on an `N x A` panel (observations by assets) and use
//! two-pass centring, which keeps the covariance symmetric and positive semi-definite up
//! to rounding.

use nalgebra::{DMatrix, DVector};

/// Per-column arithmetic mean, as an `A x 1` vector.
pub fn column_means(returns: &DMatrix<f64>) -> DVector<f64> {
    let n = returns.nrows() as f64;
    DVector::from_iterator(
        returns.ncols(),
        returns.column_iter().map(|c| c.sum() / n),
    )
}

/// Unbiased sample covariance (`N - 1` divisor) of the columns of `returns`.
///
/// Entry `(i, j)` is the sample covariance of columns `i` and `j`. Only the upper
/// triangle is computed and mirrored, so the result is exactly symmetric.
///
/// Callers must supply at least two rows.
pub fn sample_covariance(returns: &DMatrix<f64>, means: &DVector<f64>) -> DMatrix<f64> {
    let n_obs = returns.nrows();
    let n_assets = returns.ncols();
    debug_assert!(n_obs >= 2);
    debug_assert_eq!(means.len(), n_assets);

    let mut centered = returns.clone();
    for (j, mut col) in centered.column_iter_mut().enumerate() {
        col.add_scalar_mut(-means[j]);
    }

    let denom = (n_obs - 1) as f64;
    let mut cov = DMatrix::zeros(n_assets, n_assets);
    for i in 0..n_assets {
        for j in i..n_assets {
            let v = centered.column(i).dot(&centered.column(j)) / denom;
            cov[(i, j)] = v;
            cov[(j, i)] = v;
        }
    }
    cov
}

/// Quadratic form `w' C w`.
pub fn portfolio_variance(weights: &DVector<f64>, covariance: &DMatrix<f64>) -> f64 {
    weights.dot(&(covariance * weights))
}
