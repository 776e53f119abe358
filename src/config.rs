//! Analysis configuration
//!
//! Tunables for the correlation engine. Every field has a default, so a
//! partial JSON document is a valid configuration.

use crate::align::MissingValuePolicy;
use crate::correlation::{DEFAULT_LAG_MIN_SAMPLES, DEFAULT_MIN_SAMPLES};
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Default cap on results per metric group
pub const DEFAULT_TOP_N: usize = 20;

/// Default moving-average window for metric trends (series points)
pub const DEFAULT_TREND_WINDOW: usize = 7;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum aligned rows for a sweep correlation
    pub sweep_min_samples: usize,
    /// Minimum aligned rows for each lag-profile slot
    pub lag_min_samples: usize,
    /// Maximum results kept per metric in the by-metric grouping
    pub top_n: usize,
    /// Moving-average window for metric trends
    pub trend_window: usize,
    /// How untracked factor days enter the correlation
    pub missing_value_policy: MissingValuePolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sweep_min_samples: DEFAULT_MIN_SAMPLES,
            lag_min_samples: DEFAULT_LAG_MIN_SAMPLES,
            top_n: DEFAULT_TOP_N,
            trend_window: DEFAULT_TREND_WINDOW,
            missing_value_policy: MissingValuePolicy::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_sweep_min_samples(mut self, min_samples: usize) -> Self {
        self.sweep_min_samples = min_samples;
        self
    }

    pub fn with_lag_min_samples(mut self, min_samples: usize) -> Self {
        self.lag_min_samples = min_samples;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_missing_value_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_value_policy = policy;
        self
    }

    /// Reject settings the engine cannot honour
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.sweep_min_samples < 2 || self.lag_min_samples < 2 {
            return Err(AnalysisError::InvalidConfig(
                "minimum sample counts must be at least 2".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(AnalysisError::InvalidConfig(
                "top_n must be positive".to_string(),
            ));
        }
        if self.trend_window == 0 {
            return Err(AnalysisError::InvalidConfig(
                "trend_window must be positive".to_string(),
            ));
        }
        if let MissingValuePolicy::FillWith(value) = self.missing_value_policy {
            if !value.is_finite() {
                return Err(AnalysisError::InvalidConfig(format!(
                    "fill value must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.sweep_min_samples, 7);
        assert_eq!(config.lag_min_samples, 5);
        assert_eq!(config.top_n, 20);
        assert_eq!(config.missing_value_policy, MissingValuePolicy::FillWith(0.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AnalysisConfig::from_json(r#"{"top_n": 5}"#).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.sweep_min_samples, 7);
    }

    #[test]
    fn test_roundtrip() {
        let config = AnalysisConfig::default()
            .with_sweep_min_samples(10)
            .with_missing_value_policy(MissingValuePolicy::ExcludeUntracked);
        let json = config.to_json().unwrap();
        assert_eq!(AnalysisConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(AnalysisConfig::default().with_top_n(0).validate().is_err());
        assert!(AnalysisConfig::default()
            .with_lag_min_samples(1)
            .validate()
            .is_err());
        let err = AnalysisConfig::from_json(r#"{"trend_window": 0}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = AnalysisConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, AnalysisError::JsonError(_)));
    }
}
