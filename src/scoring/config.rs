use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::aggregate::{AggregationPolicy, DEFAULT_ALPHA};
use super::normalize::{normalize, RawVoteSubmission};
use super::weights::WeightVector;

/// Scoring and aggregation configuration.
///
/// Every field is optional; missing fields fall back to the built-in
/// defaults (running average, documented default weights).
///
/// Example YAML:
/// ```yaml
/// scoring:
///   policy: ema
///   alpha: 0.1
///   default_weights:
///     social: 30
///     environmental: 20
///     political: 20
///     philanthropy: 20
///     cultural: 10
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Aggregation policy: "running-average" (default) or "ema"
    #[serde(default)]
    pub policy: Option<String>,

    /// EMA smoothing factor in (0, 1]; only meaningful with `policy: ema`
    #[serde(default)]
    pub alpha: Option<f64>,

    /// Starting weights, any non-negative scale; normalized on load
    #[serde(default)]
    pub default_weights: Option<BTreeMap<String, f64>>,
}

impl ScoringConfig {
    /// Resolve the configured aggregation policy.
    ///
    /// Call `validate_scoring` first for user-facing error lists; this only
    /// reports the first problem.
    pub fn policy(&self) -> Result<AggregationPolicy> {
        match self.policy.as_deref().map(str::trim) {
            None | Some("running-average") => Ok(AggregationPolicy::RunningAverage),
            Some("ema") => {
                let alpha = self.alpha.unwrap_or(DEFAULT_ALPHA);
                Ok(AggregationPolicy::ema(alpha)?)
            }
            Some(other) => Err(anyhow!(
                "unknown aggregation policy '{}', expected running-average or ema",
                other
            )),
        }
    }

    /// Resolve the configured starting weights, normalized to sum to 1.0.
    pub fn initial_weights(&self) -> Result<WeightVector> {
        match &self.default_weights {
            None => Ok(WeightVector::default()),
            Some(map) => {
                let raw = RawVoteSubmission::from_pairs(map.iter().map(|(k, v)| (k, *v)))?;
                Ok(normalize(&raw)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Category, EPSILON};

    #[test]
    fn test_default_scoring_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.policy().unwrap(), AggregationPolicy::RunningAverage);
        assert_eq!(config.initial_weights().unwrap(), WeightVector::default());
    }

    #[test]
    fn test_scoring_config_serde_roundtrip() {
        let mut weights = BTreeMap::new();
        weights.insert("social".to_string(), 50.0);
        weights.insert("cultural".to_string(), 50.0);
        let config = ScoringConfig {
            policy: Some("ema".to_string()),
            alpha: Some(0.2),
            default_weights: Some(weights),
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: ScoringConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_scoring_config_parse() {
        let yaml = r#"
policy: ema
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.policy, Some("ema".to_string()));
        assert!(config.alpha.is_none());
        assert_eq!(config.policy().unwrap(), AggregationPolicy::ema(0.1).unwrap());
    }

    #[test]
    fn test_full_scoring_config_parse() {
        let yaml = r#"
policy: ema
alpha: 0.25
default_weights:
  social: 40
  environmental: 30
  political: 10
  philanthropy: 10
  cultural: 10
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.policy().unwrap(), AggregationPolicy::ema(0.25).unwrap());

        let weights = config.initial_weights().unwrap();
        assert!((weights.get(Category::Social) - 0.4).abs() < EPSILON);
        assert!((weights.get(Category::Environmental) - 0.3).abs() < EPSILON);
        assert!(weights.is_normalized());
    }

    #[test]
    fn test_empty_scoring_config_parse() {
        let config: ScoringConfig = serde_saphyr::from_str("{}").unwrap();
        assert!(config.policy.is_none());
        assert!(config.alpha.is_none());
        assert!(config.default_weights.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "smoothing: 0.5\n";
        let result: Result<ScoringConfig, _> = serde_saphyr::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_policy_errors() {
        let config = ScoringConfig {
            policy: Some("median".to_string()),
            ..Default::default()
        };
        assert!(config.policy().is_err());
    }

    #[test]
    fn test_initial_weights_unknown_category_errors() {
        let mut weights = BTreeMap::new();
        weights.insert("economic".to_string(), 1.0);
        let config = ScoringConfig {
            default_weights: Some(weights),
            ..Default::default()
        };
        assert!(config.initial_weights().is_err());
    }
}
