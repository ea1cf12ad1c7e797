//! Access decision resolution.
//!
//! Policies are walked in descending priority order (ties keep their input
//! order). Each applicable policy contributes its id, a reasoning line and
//! its actions, and escalates the running [`Verdict`]. Escalation only ever
//! moves towards [`Verdict::Deny`]; once reached, no further policy is
//! evaluated. Trust-score gating applies only when no policy restricted the
//! request.
//!
//! ```text
//!            remediation action           deny action
//!   Allow ───────────────────────▶ Conditional ─────────▶ Deny (final)
//!     │                                                    ▲
//!     └──────────────────── deny action ───────────────────┘
//! ```

use crate::config::EngineConfig;
use crate::trust::TrustScore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use warden_policy::{
    Action, ActionType, Policy, dedup_actions, evaluation_order, policy_applies,
};
use warden_types::Context;

/// Parameter value attached to the MFA requirement added by trust gating.
pub const LOW_TRUST_REASON: &str = "low_trust_score";

// ============================================================================
// Verdict
// ============================================================================

/// Outcome of an access evaluation, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    Conditional,
    Deny,
}

impl Verdict {
    /// Merges two verdicts, keeping the more severe one.
    pub fn escalate(self, other: Self) -> Self {
        self.max(other)
    }

    /// Whether no further escalation is possible.
    pub fn is_final(self) -> bool {
        self == Self::Deny
    }

    /// The verdict a policy imposes when it applies.
    pub fn imposed_by(policy: &Policy) -> Self {
        if policy.denies() {
            Self::Deny
        } else if policy.requires_remediation() {
            Self::Conditional
        } else {
            Self::Allow
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Conditional => "conditional",
            Self::Deny => "deny",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Access Decision
// ============================================================================

/// The engine's answer to a single access request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub decision: Verdict,
    pub confidence: f64,
    /// Ids of the policies that matched, in evaluation order.
    pub applied_policies: Vec<String>,
    /// Deduplicated remediation actions.
    pub required_actions: Vec<Action>,
    pub reasoning: Vec<String>,
    pub expires_at: DateTime<Utc>,
    /// Present only for [`Verdict::Conditional`] decisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    pub trust_score: TrustScore,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        self.decision == Verdict::Allow
    }

    pub fn is_denied(&self) -> bool {
        self.decision == Verdict::Deny
    }

    /// Whether the decision is still valid at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Resolves an access decision for `context` against `policies` as of `now`.
pub fn resolve(
    context: &Context,
    policies: &[Policy],
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> AccessDecision {
    let trust_score = TrustScore::compute(context, &config.weights, now);

    let mut verdict = Verdict::Allow;
    let mut applied_policies = Vec::new();
    let mut required_actions = Vec::new();
    let mut reasoning = Vec::new();

    for policy in evaluation_order(policies) {
        if !policy_applies(policy, context) {
            continue;
        }

        let imposed = Verdict::imposed_by(policy);
        debug!(
            policy_id = %policy.id,
            priority = policy.priority,
            imposed = %imposed,
            "Policy applied"
        );

        applied_policies.push(policy.id.clone());
        reasoning.push(describe_match(policy));
        required_actions.extend(policy.actions.iter().cloned());

        verdict = verdict.escalate(imposed);
        if verdict.is_final() {
            break;
        }
    }

    if verdict == Verdict::Allow {
        let thresholds = &config.thresholds;
        let overall = trust_score.overall;
        if overall < thresholds.deny_below {
            verdict = Verdict::Deny;
            reasoning.push(format!(
                "Trust score {overall:.2} is below the minimum of {:.2}",
                thresholds.deny_below
            ));
        } else if overall < thresholds.conditional_below {
            verdict = Verdict::Conditional;
            reasoning.push(format!(
                "Trust score {overall:.2} is below {:.2}; multi-factor authentication required",
                thresholds.conditional_below
            ));
            required_actions.push(
                Action::new(ActionType::RequireMfa).with_parameter("reason", LOW_TRUST_REASON),
            );
        }
    }

    let required_actions = dedup_actions(required_actions);
    let conditions =
        (verdict == Verdict::Conditional).then(|| requirement_phrases(&required_actions));

    AccessDecision {
        decision: verdict,
        confidence: config.confidence.confidence(applied_policies.len()),
        applied_policies,
        required_actions,
        reasoning,
        expires_at: now + config.decision_ttl(),
        conditions,
        trust_score,
    }
}

/// Reasoning line for a policy that matched.
fn describe_match(policy: &Policy) -> String {
    if policy.conditions.is_empty() {
        return format!("Policy '{}' applies unconditionally", policy.name);
    }

    let clauses: Vec<String> = policy
        .conditions
        .iter()
        .map(|c| format!("{} {} {}", c.field, c.operator, c.value))
        .collect();
    format!("Policy '{}' matched: {}", policy.name, clauses.join(" and "))
}

/// Human-readable requirements, one per distinct phrase, in action order.
fn requirement_phrases(actions: &[Action]) -> Vec<String> {
    let mut phrases: Vec<String> = Vec::with_capacity(actions.len());
    for action in actions {
        let phrase = action.action_type.requirement_phrase();
        if !phrases.contains(&phrase) {
            phrases.push(phrase);
        }
    }
    phrases
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use warden_policy::{Condition, PolicyCategory};
    use warden_types::{NetworkContext, UserContext};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 12, 10, 0, 0).unwrap()
    }

    fn policy(id: &str, priority: i32, action: ActionType) -> Policy {
        Policy::new(id, id, PolicyCategory::Identity)
            .with_action(Action::new(action))
            .with_priority(priority)
    }

    #[test]
    fn test_verdict_ordering() {
        assert!(Verdict::Allow < Verdict::Conditional);
        assert!(Verdict::Conditional < Verdict::Deny);
        assert_eq!(Verdict::Deny.escalate(Verdict::Allow), Verdict::Deny);
        assert_eq!(
            Verdict::Allow.escalate(Verdict::Conditional),
            Verdict::Conditional
        );
        assert!(Verdict::Deny.is_final());
        assert!(!Verdict::Conditional.is_final());
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        let json = serde_json::to_string(&Verdict::Conditional).expect("serialize");
        assert_eq!(json, "\"conditional\"");
    }

    #[test]
    fn test_imposed_verdict() {
        assert_eq!(
            Verdict::imposed_by(&policy("p", 0, ActionType::Monitor)),
            Verdict::Allow
        );
        assert_eq!(
            Verdict::imposed_by(&policy("p", 0, ActionType::StepUpAuth)),
            Verdict::Conditional
        );
        let mixed = policy("p", 0, ActionType::RequireMfa).with_action(Action::new(ActionType::Deny));
        assert_eq!(Verdict::imposed_by(&mixed), Verdict::Deny);
    }

    #[test]
    fn test_empty_condition_policy_always_applies() {
        let policies = [policy("monitor-all", 1, ActionType::Monitor)];
        let decision = resolve(&Context::new(), &policies, &EngineConfig::default(), now());
        assert_eq!(decision.applied_policies, ["monitor-all"]);
        assert!(decision.reasoning[0].contains("unconditionally"));
    }

    #[test]
    fn test_inactive_policies_are_skipped() {
        let policies = [policy("block", 100, ActionType::Deny).with_active(false)];
        let decision = resolve(&Context::new(), &policies, &EngineConfig::default(), now());
        assert!(decision.applied_policies.is_empty());
        // Empty context scores 0.44: conditional through trust gating
        assert_eq!(decision.decision, Verdict::Conditional);
    }

    #[test]
    fn test_priority_order_with_stable_ties() {
        let policies = [
            policy("low", 1, ActionType::Monitor),
            policy("tie-a", 5, ActionType::Monitor),
            policy("high", 9, ActionType::Monitor),
            policy("tie-b", 5, ActionType::Monitor),
        ];
        let decision = resolve(&Context::new(), &policies, &EngineConfig::default(), now());
        assert_eq!(decision.applied_policies, ["high", "tie-a", "tie-b", "low"]);
    }

    #[test]
    fn test_deny_short_circuits_lower_priority() {
        let policies = [
            policy("mfa", 10, ActionType::RequireMfa),
            policy("block", 50, ActionType::Deny),
            policy("audit", 1, ActionType::Monitor),
        ];
        let decision = resolve(&Context::new(), &policies, &EngineConfig::default(), now());
        assert_eq!(decision.decision, Verdict::Deny);
        assert_eq!(decision.applied_policies, ["block"]);
        assert_eq!(decision.required_actions.len(), 1);
        assert!(decision.conditions.is_none());
    }

    #[test]
    fn test_conditional_does_not_short_circuit() {
        let policies = [
            policy("mfa", 50, ActionType::RequireMfa),
            policy("block", 10, ActionType::Deny),
        ];
        let decision = resolve(&Context::new(), &policies, &EngineConfig::default(), now());
        assert_eq!(decision.decision, Verdict::Deny);
        assert_eq!(decision.applied_policies, ["mfa", "block"]);
    }

    #[test]
    fn test_low_trust_adds_tagged_mfa_requirement() {
        let decision = resolve(&Context::new(), &[], &EngineConfig::default(), now());
        assert_eq!(decision.decision, Verdict::Conditional);
        assert_eq!(decision.required_actions.len(), 1);
        let action = &decision.required_actions[0];
        assert_eq!(action.action_type, ActionType::RequireMfa);
        assert_eq!(action.parameters["reason"], LOW_TRUST_REASON);
        assert_eq!(
            decision.conditions.as_deref(),
            Some(&["Multi-factor authentication required".to_string()][..])
        );
    }

    #[test]
    fn test_trust_gating_skipped_when_policy_restricted() {
        let policies = [policy("approval", 1, ActionType::RequireApproval)];
        let decision = resolve(&Context::new(), &policies, &EngineConfig::default(), now());
        assert_eq!(decision.decision, Verdict::Conditional);
        assert!(
            decision
                .required_actions
                .iter()
                .all(|a| a.action_type != ActionType::RequireMfa)
        );
    }

    #[test]
    fn test_threshold_overrides() {
        let mut config = EngineConfig::default();
        config.thresholds.deny_below = 0.5;
        config.thresholds.conditional_below = 0.5;
        let decision = resolve(&Context::new(), &[], &config, now());
        assert_eq!(decision.decision, Verdict::Deny);
        assert!(decision.reasoning[0].contains("below the minimum"));

        config.thresholds.deny_below = 0.1;
        config.thresholds.conditional_below = 0.2;
        let decision = resolve(&Context::new(), &[], &config, now());
        assert_eq!(decision.decision, Verdict::Allow);
        assert!(decision.conditions.is_none());
    }

    #[test]
    fn test_required_actions_are_deduplicated() {
        let policies = [
            policy("a", 2, ActionType::RequireMfa),
            policy("b", 1, ActionType::RequireMfa),
        ];
        let decision = resolve(&Context::new(), &policies, &EngineConfig::default(), now());
        assert_eq!(decision.applied_policies.len(), 2);
        assert_eq!(decision.required_actions.len(), 1);
    }

    #[test]
    fn test_confidence_and_expiry() {
        let policies: Vec<Policy> = (0..6)
            .map(|i| policy(&format!("m{i}"), i, ActionType::Monitor))
            .collect();

        let decision = resolve(&Context::new(), &policies[..1], &EngineConfig::default(), now());
        assert!((decision.confidence - 0.6).abs() < 1e-9);

        let decision = resolve(&Context::new(), &policies, &EngineConfig::default(), now());
        assert!((decision.confidence - 0.9).abs() < 1e-9);
        assert_eq!(decision.expires_at, now() + TimeDelta::minutes(15));
        assert!(decision.is_valid_at(now() + TimeDelta::minutes(14)));
        assert!(!decision.is_valid_at(now() + TimeDelta::minutes(15)));
    }

    #[test]
    fn test_reasoning_names_matching_conditions() {
        let policies = [Policy::admin_mfa_required()];
        let context = Context::new().with_user(UserContext::new("u-1", "admin"));
        let decision = resolve(&context, &policies, &EngineConfig::default(), now());
        assert_eq!(
            decision.reasoning[0],
            "Policy 'Admin MFA Required' matched: user.role equals \"admin\""
        );
    }

    #[test]
    fn test_policy_with_unmatched_condition_is_not_applied() {
        let block = Policy::new("block", "Block", PolicyCategory::Network)
            .with_condition(Condition::greater_than("network.threatLevel", 0.8))
            .with_action(Action::new(ActionType::Deny));
        let context =
            Context::new().with_network(NetworkContext::new("10.0.0.1", "HQ").with_threat_level(0.2));
        let decision = resolve(&context, &[block], &EngineConfig::default(), now());
        assert!(decision.applied_policies.is_empty());
        assert_ne!(decision.decision, Verdict::Deny);
    }

    #[test]
    fn test_decision_wire_shape() {
        let decision = resolve(&Context::new(), &[], &EngineConfig::default(), now());
        let json = serde_json::to_value(&decision).expect("serialize");
        assert_eq!(json["decision"], "conditional");
        assert!(json.get("appliedPolicies").is_some());
        assert!(json.get("requiredActions").is_some());
        assert!(json.get("expiresAt").is_some());
        assert!(json.get("trustScore").is_some());
        assert_eq!(json["requiredActions"][0]["type"], "require_mfa");

        let allowed = resolve(
            &Context::new(),
            &[],
            &EngineConfig {
                thresholds: crate::config::DecisionThresholds {
                    deny_below: 0.0,
                    conditional_below: 0.0,
                },
                ..EngineConfig::default()
            },
            now(),
        );
        let json = serde_json::to_value(&allowed).expect("serialize");
        assert!(json.get("conditions").is_none());
    }
}
