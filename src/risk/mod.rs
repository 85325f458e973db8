//! Top-level risk namespace.
//!
//! `varcov` holds the parametric variance-covariance estimator; this file only defines
//! the public import surface (`varferric::risk::*`).

pub mod varcov;

pub use varcov::{
    FittedModel, FittedModelSnapshot, VarCovEstimator, VarCovFit, normal_loss_var_es,
    varcov_var_es,
};
