//! Continuous compliance checking.
//!
//! Re-evaluates a live session against the policy set to detect drift from
//! the original grant: a policy that became applicable after access was
//! granted, or a requirement that was never completed. Only MFA enforcement
//! is checked; the verdict logic of [`crate::decision`] is not involved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_policy::{Action, ActionType, Policy, dedup_actions, policy_applies};
use warden_types::Context;

/// Reason recorded for an unmet MFA requirement.
pub const MFA_NOT_VERIFIED: &str = "MFA required but not verified";

/// A policy requirement the session does not currently satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceViolation {
    pub policy_id: String,
    /// Display name of the violated policy.
    pub policy: String,
    pub reason: String,
}

/// Outcome of a compliance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    /// True iff `violations` is empty.
    pub compliant: bool,
    pub violations: Vec<ComplianceViolation>,
    /// Deduplicated remediation actions.
    pub recommended_actions: Vec<Action>,
    pub checked_at: DateTime<Utc>,
}

/// Checks `context` against every active, applicable policy, in input order.
pub fn check(context: &Context, policies: &[Policy], now: DateTime<Utc>) -> ComplianceResult {
    let mfa_verified = context.session_mfa_verified();

    let mut violations = Vec::new();
    let mut recommended_actions = Vec::new();

    for policy in policies.iter().filter(|p| p.active) {
        if mfa_verified || !policy.has_action(&ActionType::RequireMfa) {
            continue;
        }
        if !policy_applies(policy, context) {
            continue;
        }

        violations.push(ComplianceViolation {
            policy_id: policy.id.clone(),
            policy: policy.name.clone(),
            reason: MFA_NOT_VERIFIED.to_string(),
        });
        recommended_actions
            .push(Action::new(ActionType::RequireMfa).with_parameter("immediate", true));
    }

    ComplianceResult {
        compliant: violations.is_empty(),
        violations,
        recommended_actions: dedup_actions(recommended_actions),
        checked_at: now,
    }
}

// ============================================================================
// Tests
// ============================================================================
