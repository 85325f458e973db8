//! Estimator configuration.
//!
//! Configurations are plain serde payloads so they can be persisted next to the price
//! files they apply to. Missing fields fall back to [`EstimatorConfig::default`].
//!
//! # Examples
//! ```rust
//! use varferric::core::EstimatorConfig;
//!
//! let cfg = EstimatorConfig::from_json(r#"{ "confidence": 0.975 }"#).unwrap();
//! assert_eq!(cfg.confidence, 0.975);
//! assert!(!cfg.reject_rank_deficient);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{ConfidenceLevel, DEFAULT_CONFIDENCE, RiskError};

/// Settings shared by every fit of a [`crate::risk::VarCovEstimator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Confidence level used by `estimate`.
    pub confidence: f64,
    /// Fail with `IllConditionedCovariance` when assets outnumber observations
    /// instead of only logging a warning.
    pub reject_rank_deficient: bool,
    /// Portfolio variances at or below this value are treated as exactly zero.
    pub variance_floor: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            reject_rank_deficient: false,
            variance_floor: 0.0,
        }
    }
}

impl EstimatorConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json(json: &str) -> Result<Self, RiskError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| RiskError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RiskError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RiskError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, RiskError> {
        serde_json::to_string_pretty(self).map_err(|e| RiskError::InvalidConfig(e.to_string()))
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), RiskError> {
        ConfidenceLevel::new(self.confidence)?;
        if !(self.variance_floor.is_finite() && self.variance_floor >= 0.0) {
            return Err(RiskError::InvalidConfig(format!(
                "variance_floor must be finite and >= 0, got {}",
                self.variance_floor
            )));
        }
        Ok(())
    }

    /// Configured confidence level.
    pub fn confidence_level(&self) -> Result<ConfidenceLevel, RiskError> {
        ConfidenceLevel::new(self.confidence)
    }
}
