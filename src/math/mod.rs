//! Numerical building blocks: standard-normal functions and sample moments.

pub mod moments;

use statrs::distribution::{ContinuousCDF, Normal};

pub use moments::{column_means, portfolio_variance, sample_covariance};

/// Standard normal density `phi(x)`.
pub fn normal_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal distribution function `Phi(x)`.
pub fn normal_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Standard normal quantile `Phi^{-1}(p)`.
///
/// Returns `-inf`/`+inf` at `p = 0`/`p = 1` and NaN outside `[0, 1]`.
pub fn normal_inv_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    Normal::standard().inverse_cdf(p)
}
