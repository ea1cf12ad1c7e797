//! Engine tuning parameters.
//!
//! Every numeric constant the engine uses lives here, with defaults equal to
//! the reference scoring model. Deployments can override them through
//! `warden-config`; [`EngineConfig::validate`] keeps overrides inside the
//! ranges the scoring and decision invariants rely on.

use crate::error::{EngineError, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Upper bound on how long a decision may stay valid.
pub const MAX_DECISION_TTL_SECS: u64 = 86_400;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

// ============================================================================
// Trust Weights
// ============================================================================

/// Weights of the four trust dimensions in the overall score.
///
/// Must be non-negative and sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustWeights {
    pub user: f64,
    pub device: f64,
    pub network: f64,
    pub context: f64,
}

impl Default for TrustWeights {
    fn default() -> Self {
        Self {
            user: 0.25,
            device: 0.30,
            network: 0.25,
            context: 0.20,
        }
    }
}

impl TrustWeights {
    pub fn sum(&self) -> f64 {
        self.user + self.device + self.network + self.context
    }
}

// ============================================================================
// Thresholds
// ============================================================================

/// Trust-score bands applied when no policy restricted the request.
///
/// `overall < deny_below` denies, `overall < conditional_below` requires
/// MFA, anything else is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    pub deny_below: f64,
    pub conditional_below: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            deny_below: 0.3,
            conditional_below: 0.6,
        }
    }
}

// ============================================================================
// Confidence
// ============================================================================

/// `confidence = min(base + per_policy * applied, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceModel {
    pub base: f64,
    pub per_policy: f64,
    pub max: f64,
}

impl Default for ConfidenceModel {
    fn default() -> Self {
        Self {
            base: 0.5,
            per_policy: 0.1,
            max: 0.9,
        }
    }
}

impl ConfidenceModel {
    /// Confidence for a decision corroborated by `applied` policies.
    pub fn confidence(&self, applied: usize) -> f64 {
        (self.base + self.per_policy * applied as f64).min(self.max)
    }
}

// ============================================================================
// Engine Config
// ============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: TrustWeights,
    pub thresholds: DecisionThresholds,
    pub confidence: ConfidenceModel,
    /// Validity window of an access decision, in seconds.
    pub decision_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: TrustWeights::default(),
            thresholds: DecisionThresholds::default(),
            confidence: ConfidenceModel::default(),
            decision_ttl_secs: 900,
        }
    }
}

impl EngineConfig {
    /// Validity window as a duration.
    pub fn decision_ttl(&self) -> TimeDelta {
        i64::try_from(self.decision_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or_else(|| TimeDelta::minutes(15))
    }

    /// Checks the invariants the scoring and decision logic rely on.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, weight) in [
            ("user", w.user),
            ("device", w.device),
            ("network", w.network),
            ("context", w.context),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "weight '{name}' must be a non-negative number, got {weight}"
                )));
            }
        }
        if (w.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::InvalidConfig(format!(
                "trust weights must sum to 1.0, got {}",
                w.sum()
            )));
        }

        let t = &self.thresholds;
        if !(t.deny_below.is_finite() && t.conditional_below.is_finite())
            || t.deny_below < 0.0
            || t.deny_below > t.conditional_below
            || t.conditional_below > 1.0
        {
            return Err(EngineError::InvalidConfig(format!(
                "thresholds must satisfy 0 <= deny_below <= conditional_below <= 1, got {} and {}",
                t.deny_below, t.conditional_below
            )));
        }

        let c = &self.confidence;
        if !(c.base.is_finite() && c.per_policy.is_finite() && c.max.is_finite())
            || c.base < 0.0
            || c.per_policy < 0.0
            || c.max > 1.0
            || c.base > c.max
        {
            return Err(EngineError::InvalidConfig(format!(
                "confidence must satisfy 0 <= base <= max <= 1 with per_policy >= 0, got base {} step {} max {}",
                c.base, c.per_policy, c.max
            )));
        }

        if self.decision_ttl_secs == 0 || self.decision_ttl_secs > MAX_DECISION_TTL_SECS {
            return Err(EngineError::InvalidConfig(format!(
                "decision_ttl_secs must be within 1..={MAX_DECISION_TTL_SECS}, got {}",
                self.decision_ttl_secs
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        config.validate().expect("defaults are valid");
        assert!((config.weights.sum() - 1.0).abs() < 1e-9);
        assert_eq!(config.decision_ttl(), TimeDelta::minutes(15));
    }

    #[test]
    fn test_confidence_grows_then_caps() {
        let model = ConfidenceModel::default();
        assert!((model.confidence(0) - 0.5).abs() < 1e-9);
        assert!((model.confidence(2) - 0.7).abs() < 1e-9);
        assert!((model.confidence(4) - 0.9).abs() < 1e-9);
        assert!((model.confidence(40) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = EngineConfig::default();
        config.weights.context = 0.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = EngineConfig::default();
        config.weights.user = -0.25;
        config.weights.device = 0.8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_order_enforced() {
        let mut config = EngineConfig::default();
        config.thresholds.deny_below = 0.7;
        assert!(config.validate().is_err());

        config.thresholds.deny_below = 0.0;
        config.thresholds.conditional_below = 0.0;
        config.validate().expect("zero thresholds allow everything");
    }

    #[test]
    fn test_confidence_bounds_enforced() {
        let mut config = EngineConfig::default();
        config.confidence.max = 1.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.confidence.base = 0.95;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ttl_bounds_enforced() {
        let mut config = EngineConfig::default();
        config.decision_ttl_secs = 0;
        assert!(config.validate().is_err());

        config.decision_ttl_secs = MAX_DECISION_TTL_SECS + 1;
        assert!(config.validate().is_err());

        config.decision_ttl_secs = 60;
        config.validate().expect("one minute is valid");
        assert_eq!(config.decision_ttl(), TimeDelta::minutes(1));
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"thresholds": {"deny_below": 0.2}}"#).expect("parse");
        assert!((config.thresholds.deny_below - 0.2).abs() < 1e-9);
        assert!((config.thresholds.conditional_below - 0.6).abs() < 1e-9);
        assert_eq!(config.decision_ttl_secs, 900);
    }
}
