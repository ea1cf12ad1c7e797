//! Engine facade.
//!
//! [`AccessEngine`] bundles a validated [`EngineConfig`] with the audit flag
//! and exposes the three evaluation operations. Each operation reads the
//! clock once on entry; the `*_at` variants take that instant explicitly.

use crate::compliance::{self, ComplianceResult};
use crate::config::EngineConfig;
use crate::decision::{self, AccessDecision, Verdict};
use crate::error::Result;
use crate::trust::TrustScore;
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use warden_policy::Policy;
use warden_types::Context;

/// Zero-trust access decision engine.
///
/// Stateless across calls: decisions depend only on the context, the
/// policies and the configuration. Safe to share between threads.
#[derive(Debug, Clone)]
pub struct AccessEngine {
    config: EngineConfig,

    /// Whether to log decisions and compliance violations.
    audit_enabled: bool,
}

impl Default for AccessEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            audit_enabled: true,
        }
    }
}

impl AccessEngine {
    /// Creates an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            audit_enabled: true,
        })
    }

    /// Disables audit logging (for testing).
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Trust score
    // ------------------------------------------------------------------------

    pub fn calculate_trust_score(&self, context: &Context) -> TrustScore {
        self.calculate_trust_score_at(context, Utc::now())
    }

    pub fn calculate_trust_score_at(&self, context: &Context, now: DateTime<Utc>) -> TrustScore {
        TrustScore::compute(context, &self.config.weights, now)
    }

    // ------------------------------------------------------------------------
    // Access decision
    // ------------------------------------------------------------------------

    /// Decides whether the request described by `context` may proceed.
    ///
    /// **Audit:** Logs every decision; denials at warn level.
    pub fn evaluate_access(&self, context: &Context, policies: &[Policy]) -> AccessDecision {
        self.evaluate_access_at(context, policies, Utc::now())
    }

    pub fn evaluate_access_at(
        &self,
        context: &Context,
        policies: &[Policy],
        now: DateTime<Utc>,
    ) -> AccessDecision {
        let decision = decision::resolve(context, policies, &self.config, now);

        if self.audit_enabled {
            let user = context.user.as_ref().and_then(|u| u.id.as_deref()).unwrap_or("-");
            let resource = context.request.as_ref().and_then(|r| r.resource.as_deref()).unwrap_or("-");
            if decision.decision == Verdict::Deny {
                warn!(
                    user = %user,
                    resource = %resource,
                    trust = decision.trust_score.overall,
                    applied = ?decision.applied_policies,
                    "Access denied"
                );
            } else {
                info!(
                    user = %user,
                    resource = %resource,
                    decision = %decision.decision,
                    trust = decision.trust_score.overall,
                    applied = ?decision.applied_policies,
                    "Access decided"
                );
            }
        }

        decision
    }

    // ------------------------------------------------------------------------
    // Continuous compliance
    // ------------------------------------------------------------------------

    /// Re-checks a live session against the policy set.
    ///
    /// **Audit:** Logs every violation.
    pub fn perform_continuous_compliance(
        &self,
        context: &Context,
        policies: &[Policy],
    ) -> ComplianceResult {
        self.perform_continuous_compliance_at(context, policies, Utc::now())
    }

    pub fn perform_continuous_compliance_at(
        &self,
        context: &Context,
        policies: &[Policy],
        now: DateTime<Utc>,
    ) -> ComplianceResult {
        let result = compliance::check(context, policies, now);

        if self.audit_enabled {
            let session = context.session.as_ref().and_then(|s| s.id.as_deref()).unwrap_or("-");
            for violation in &result.violations {
                warn!(
                    session = %session,
                    policy_id = %violation.policy_id,
                    reason = %violation.reason,
                    "Compliance violation"
                );
            }
        }

        result
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Scores `context` with the default configuration.
pub fn calculate_trust_score(context: &Context) -> TrustScore {
    AccessEngine::default().calculate_trust_score(context)
}

/// Evaluates access with the default configuration.
pub fn evaluate_access(context: &Context, policies: &[Policy]) -> AccessDecision {
    AccessEngine::default().evaluate_access(context, policies)
}

/// Runs a compliance check with the default configuration.
pub fn perform_continuous_compliance(context: &Context, policies: &[Policy]) -> ComplianceResult {
    AccessEngine::default().perform_continuous_compliance(context, policies)
}

// ============================================================================
// Tests
// ============================================================================
