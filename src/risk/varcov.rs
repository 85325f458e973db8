//! Parametric variance-covariance VaR and ES for linear portfolios.
//!
//! Asset log-returns are modelled as jointly normal, `r ~ N(mu, Sigma)`, and the
//! portfolio loss is linearised in the exposures `w`:
//!
//! `L = -w'r ~ N(-w'mu, w'Sigma w)`.
//!
//! With `z = Phi^{-1}(alpha)` this gives
//! - `VaR_alpha = -w'mu + sqrt(w'Sigma w) * z`,
//! - `ES_alpha  = -w'mu + sqrt(w'Sigma w) * phi(z) / (1 - alpha)`.
//!
//! `mu` and `Sigma` are the sample mean and unbiased (`N - 1`) sample covariance of the
//! return panel. Fitting is a pure function of its inputs: the fitted moments are
//! returned as a [`FittedModel`] value, and an estimator only carries immutable
//! configuration, so one estimator can be shared across threads.
//!
//! Numerical notes: with more assets than observations the sample covariance is singular.
//! The quadratic form stays well defined and non-negative, so this is reported as a
//! warning unless [`EstimatorConfig::reject_rank_deficient`] is set. Tiny negative
//! variances from rounding are clamped to zero.
//!
//! References:
//! - McNeil, Frey, Embrechts, *Quantitative Risk Management* (2015), Sec. 2.2 and 9.2.
//! - J.P. Morgan/Reuters, *RiskMetrics Technical Document* (1996).
//!
//! # Examples
//! ```rust
//! use varferric::core::{ReturnMatrix, WeightVector};
//! use varferric::risk::VarCovEstimator;
//!
//! let returns =
//!     ReturnMatrix::from_columns(&[vec![0.01, -0.02, 0.015, -0.005, 0.02]]).unwrap();
//! let weights = WeightVector::new(vec![100.0]).unwrap();
//!
//! let fit = VarCovEstimator::default().fit(&returns, &weights, 0.99).unwrap();
//! assert!(fit.risk.es >= fit.risk.var);
//! assert!((fit.model.mean()[0] - 0.004).abs() < 1e-15);
//! ```

use nalgebra::{DMatrix, DVector};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{
    ConfidenceLevel, EstimatorConfig, ReturnMatrix, RiskError, RiskResult, WeightVector,
};
use crate::math::{
    column_means, normal_inv_cdf, normal_pdf, portfolio_variance, sample_covariance,
};

/// Variance-covariance risk estimator.
#[derive(Debug, Clone, Default)]
pub struct VarCovEstimator {
    config: EstimatorConfig,
}

/// Output of [`VarCovEstimator::fit`]: the risk numbers and the moments behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct VarCovFit {
    pub risk: RiskResult,
    pub model: FittedModel,
}

impl VarCovEstimator {
    pub fn new(config: EstimatorConfig) -> Result<Self, RiskError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimates the sample mean vector and covariance matrix of a return panel.
    pub fn fit_model(&self, returns: &ReturnMatrix) -> Result<FittedModel, RiskError> {
        let n_obs = returns.n_observations();
        let n_assets = returns.n_assets();

        // Centred columns span at most N - 1 dimensions.
        if n_assets >= n_obs {
            if self.config.reject_rank_deficient {
                return Err(RiskError::IllConditionedCovariance {
                    assets: n_assets,
                    observations: n_obs,
                });
            }
            warn!(
                assets = n_assets,
                observations = n_obs,
                "sample covariance is rank deficient"
            );
        }

        let x = returns.as_matrix();
        let mu_hat = column_means(x);
        let cov_hat = sample_covariance(x, &mu_hat);
        debug!(
            observations = n_obs,
            assets = n_assets,
            "fitted variance-covariance model"
        );

        Ok(FittedModel {
            mu_hat,
            cov_hat,
            n_observations: n_obs,
            variance_floor: self.config.variance_floor,
        })
    }

    /// Fits the model and evaluates VaR/ES for `weights` at confidence `alpha`.
    ///
    /// Shapes and the confidence level are validated before any arithmetic.
    pub fn fit(
        &self,
        returns: &ReturnMatrix,
        weights: &WeightVector,
        alpha: f64,
    ) -> Result<VarCovFit, RiskError> {
        let alpha = ConfidenceLevel::new(alpha)?;
        check_shape(returns.n_assets(), weights)?;

        let model = self.fit_model(returns)?;
        let risk = model.risk(weights, alpha)?;
        Ok(VarCovFit { risk, model })
    }

    /// [`fit`](Self::fit) at the configured confidence level.
    pub fn estimate(
        &self,
        returns: &ReturnMatrix,
        weights: &WeightVector,
    ) -> Result<VarCovFit, RiskError> {
        self.fit(returns, weights, self.config.confidence)
    }
}

/// Sample moments of a return panel.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    mu_hat: DVector<f64>,
    cov_hat: DMatrix<f64>,
    n_observations: usize,
    variance_floor: f64,
}

/// Plain-vector form of a [`FittedModel`] for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModelSnapshot {
    pub observations: usize,
    pub mean: Vec<f64>,
    /// Row-major covariance.
    pub covariance: Vec<Vec<f64>>,
}

impl FittedModel {
    /// Sample mean vector `mu_hat`.
    pub fn mean(&self) -> &DVector<f64> {
        &self.mu_hat
    }

    /// Sample covariance matrix `cov_hat`.
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.cov_hat
    }

    pub fn n_assets(&self) -> usize {
        self.mu_hat.len()
    }

    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    /// True when `A >= N`: the centred panel has rank at most `N - 1`, so `cov_hat`
    /// is singular.
    pub fn is_rank_deficient(&self) -> bool {
        self.n_assets() >= self.n_observations
    }

    /// Expected portfolio return `w'mu`.
    pub fn portfolio_mean(&self, weights: &WeightVector) -> Result<f64, RiskError> {
        check_shape(self.n_assets(), weights)?;
        Ok(weights.as_vector().dot(&self.mu_hat))
    }

    /// Portfolio variance `w'Sigma w`, clamped at zero and floored by configuration.
    ///
    /// May overflow to `inf` for exposures near `f64::MAX.sqrt()`; the standard
    /// deviation does not.
    pub fn portfolio_variance(&self, weights: &WeightVector) -> Result<f64, RiskError> {
        let (scale, unit_var) = self.unit_variance(weights)?;
        Ok(scale * scale * unit_var)
    }

    /// Portfolio standard deviation, finite for every finite weight vector.
    pub fn portfolio_std_dev(&self, weights: &WeightVector) -> Result<f64, RiskError> {
        let (scale, unit_var) = self.unit_variance(weights)?;
        Ok(scale * unit_var.sqrt())
    }

    /// Splits `w'Sigma w` into `scale^2 * (u'Sigma u)` with `u = w / max|w_i|`, so the
    /// quadratic form never overflows. The floor is applied on the unscaled variance.
    fn unit_variance(&self, weights: &WeightVector) -> Result<(f64, f64), RiskError> {
        check_shape(self.n_assets(), weights)?;
        let scale = weights.as_vector().amax();
        if scale == 0.0 {
            return Ok((0.0, 0.0));
        }
        let unit = weights.as_vector() / scale;
        let v = portfolio_variance(&unit, &self.cov_hat);
        // An overflowing product is above any finite floor.
        let floored = v <= 0.0 || v * scale * scale <= self.variance_floor;
        Ok((scale, if floored { 0.0 } else { v }))
    }

    /// VaR and ES of the linear portfolio `weights` at confidence `alpha`.
    pub fn risk(
        &self,
        weights: &WeightVector,
        alpha: ConfidenceLevel,
    ) -> Result<RiskResult, RiskError> {
        let port_mu = self.portfolio_mean(weights)?;
        let port_sigma = self.portfolio_std_dev(weights)?;
        if port_sigma == 0.0 {
            warn!(
                port_mu,
                "zero portfolio variance, VaR and ES collapse to the mean loss"
            );
        }

        let result = normal_loss_var_es(-port_mu, port_sigma, alpha);
        debug!(
            alpha = alpha.value(),
            port_mu,
            port_sigma,
            var = result.var,
            es = result.es,
            "variance-covariance risk"
        );
        Ok(result)
    }

    /// Evaluates several portfolios against the same fitted moments.
    ///
    /// Fails on the first portfolio with the wrong number of assets.
    pub fn risk_many(
        &self,
        portfolios: &[WeightVector],
        alpha: ConfidenceLevel,
    ) -> Result<Vec<RiskResult>, RiskError> {
        #[cfg(feature = "parallel")]
        {
            portfolios
                .par_iter()
                .map(|w| self.risk(w, alpha))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            portfolios.iter().map(|w| self.risk(w, alpha)).collect()
        }
    }

    pub fn snapshot(&self) -> FittedModelSnapshot {
        FittedModelSnapshot {
            observations: self.n_observations,
            mean: self.mu_hat.iter().copied().collect(),
            covariance: self
                .cov_hat
                .row_iter()
                .map(|row| row.iter().copied().collect())
                .collect(),
        }
    }
}

/// VaR and ES of a normal loss `N(mean_loss, std_dev_loss^2)`.
///
/// # Examples
/// ```rust
/// use varferric::core::ConfidenceLevel;
/// use varferric::risk::varcov::normal_loss_var_es;
///
/// let r = normal_loss_var_es(0.0, 1.0, ConfidenceLevel::new(0.99).unwrap());
/// assert!((r.var - 2.326_347_874).abs() < 1e-8);
/// assert!((r.es - 2.665_214_220).abs() < 1e-8);
/// ```
pub fn normal_loss_var_es(
    mean_loss: f64,
    std_dev_loss: f64,
    alpha: ConfidenceLevel,
) -> RiskResult {
    let z = normal_inv_cdf(alpha.value());
    RiskResult {
        var: mean_loss + std_dev_loss * z,
        es: mean_loss + std_dev_loss * normal_pdf(z) / alpha.tail_probability(),
    }
}

/// One-shot variance-covariance VaR/ES with default configuration.
pub fn varcov_var_es(
    returns: &ReturnMatrix,
    weights: &WeightVector,
    alpha: f64,
) -> Result<RiskResult, RiskError> {
    VarCovEstimator::default()
        .fit(returns, weights, alpha)
        .map(|fit| fit.risk)
}

fn check_shape(n_assets: usize, weights: &WeightVector) -> Result<(), RiskError> {
    if weights.len() != n_assets {
        return Err(RiskError::ShapeMismatch {
            expected: n_assets,
            actual: weights.len(),
        });
    }
    Ok(())
}
