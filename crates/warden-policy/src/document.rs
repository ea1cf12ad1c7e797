//! Policy documents: parsing and validation.
//!
//! Policy sets arrive from the administrative tooling either as JSON (a bare
//! array or `{"policies": [...]}`) or as TOML (`[[policies]]` tables).
//! Parsing is lenient in the same way evaluation is: unknown operators and
//! action types survive as opaque variants. [`PolicySet::validate`] is the
//! strict pass an administrator runs before publishing a set.

use crate::error::{PolicyError, Result};
use crate::evaluator::operand_number;
use crate::fields;
use crate::policy::{ActionType, Condition, Operator, Policy, PolicySet};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Serialization format of a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFormat {
    Json,
    Toml,
}

impl PolicyFormat {
    /// Infers the format from a file extension (`.json` or `.toml`).
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            _ => Err(PolicyError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Bare(Vec<Policy>),
    Wrapped(PolicySet),
}

impl PolicySet {
    /// Parses a policy document in the given format.
    pub fn parse(text: &str, format: PolicyFormat) -> Result<Self> {
        match format {
            PolicyFormat::Json => Self::from_json_str(text),
            PolicyFormat::Toml => Self::from_toml_str(text),
        }
    }

    /// Parses a JSON document: either a bare array of policies or an object
    /// with a `policies` array.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let document: JsonDocument = serde_json::from_str(text)?;
        Ok(match document {
            JsonDocument::Bare(policies) => Self::new(policies),
            JsonDocument::Wrapped(set) => set,
        })
    }

    /// Parses a TOML document with `[[policies]]` tables.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Checks every policy and returns the first problem found.
    ///
    /// # Errors
    ///
    /// See [`PolicyError`] for the individual checks.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::with_capacity(self.policies.len());
        for policy in &self.policies {
            validate_policy(policy)?;
            if !ids.insert(policy.id.as_str()) {
                return Err(PolicyError::DuplicateId(policy.id.clone()));
            }
        }
        Ok(())
    }
}

/// Validates a single policy in isolation.
pub fn validate_policy(policy: &Policy) -> Result<()> {
    if policy.id.trim().is_empty() {
        return Err(PolicyError::EmptyId {
            name: policy.name.clone(),
        });
    }

    for condition in &policy.conditions {
        validate_condition(policy, condition)?;
    }

    for action in &policy.actions {
        if let ActionType::Other(name) = &action.action_type {
            return Err(PolicyError::UnknownAction {
                policy: policy.id.clone(),
                action: name.clone(),
            });
        }
    }

    Ok(())
}

fn validate_condition(policy: &Policy, condition: &Condition) -> Result<()> {
    if !fields::is_known_field(&condition.field) {
        return Err(PolicyError::UnknownField {
            policy: policy.id.clone(),
            field: condition.field.clone(),
        });
    }

    let invalid = |reason: &str| PolicyError::InvalidOperand {
        policy: policy.id.clone(),
        field: condition.field.clone(),
        reason: reason.to_string(),
    };

    match &condition.operator {
        Operator::Unknown(name) => {
            return Err(PolicyError::UnknownOperator {
                policy: policy.id.clone(),
                operator: name.clone(),
            });
        }
        Operator::GreaterThan | Operator::LessThan => {
            if operand_number(&condition.value).is_none() {
                return Err(invalid("expected a numeric operand"));
            }
        }
        Operator::InRange => {
            let bounds = condition
                .value
                .as_array()
                .filter(|b| b.len() == 2)
                .ok_or_else(|| invalid("expected a [min, max] array"))?;
            let (Some(min), Some(max)) = (operand_number(&bounds[0]), operand_number(&bounds[1]))
            else {
                return Err(invalid("range bounds must be numeric"));
            };
            if min > max {
                return Err(invalid("range minimum exceeds maximum"));
            }
        }
        Operator::Regex => {
            let pattern = condition
                .value
                .as_str()
                .ok_or_else(|| invalid("expected a pattern string"))?;
            Regex::new(pattern).map_err(|source| PolicyError::InvalidRegex {
                policy: policy.id.clone(),
                pattern: pattern.to_string(),
                source,
            })?;
        }
        Operator::Contains | Operator::NotContains => {
            if condition.value.is_null() {
                return Err(invalid("expected a substring operand"));
            }
        }
        Operator::Equals | Operator::NotEquals => {}
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Action, PolicyCategory};

    fn policy_with(condition: Condition) -> Policy {
        Policy::new("p1", "Test", PolicyCategory::Identity)
            .with_condition(condition)
            .with_action(Action::new(ActionType::Monitor))
    }

    #[test]
    fn test_seed_policies_validate() {
        PolicySet::seed().validate().expect("seed policies are valid");
    }

    #[test]
    fn test_parse_bare_json_array() {
        let json = r#"[
            {
                "id": "vpn-monitor",
                "name": "VPN Monitor",
                "category": "network",
                "conditions": [
                    {"field": "network.isVPN", "operator": "equals", "value": true}
                ],
                "actions": [{"type": "monitor", "parameters": {"level": "verbose"}}],
                "priority": 10
            }
        ]"#;

        let set = PolicySet::from_json_str(json).expect("parse bare array");
        assert_eq!(set.len(), 1);
        let policy = &set.policies[0];
        assert_eq!(policy.category, PolicyCategory::Network);
        assert_eq!(policy.actions[0].parameters["level"], "verbose");
        assert!(policy.active);
        set.validate().expect("valid policy");
    }

    #[test]
    fn test_parse_wrapped_json_object() {
        let json = r#"{"policies": [{"id": "a", "name": "A", "category": "data"}]}"#;
        let set = PolicySet::from_json_str(json).expect("parse wrapped object");
        assert_eq!(set.len(), 1);
        assert_eq!(set.policies[0].id, "a");
    }

    #[test]
    fn test_parse_toml_document() {
        let toml = r#"
[[policies]]
id = "restricted-after-hours"
name = "Restricted Data Monitoring"
category = "data"
priority = 40
active = false

[[policies.conditions]]
field = "application.dataClassification"
operator = "equals"
value = "restricted"

[[policies.conditions]]
field = "request.riskScore"
operator = "in_range"
value = [0.5, 1.0]

[[policies.actions]]
type = "monitor"

[policies.actions.parameters]
retention_days = 90
"#;

        let set = PolicySet::parse(toml, PolicyFormat::Toml).expect("parse toml");
        assert_eq!(set.len(), 1);
        let policy = &set.policies[0];
        assert!(!policy.active);
        assert_eq!(policy.priority, 40);
        assert_eq!(policy.conditions.len(), 2);
        assert_eq!(policy.conditions[1].operator, Operator::InRange);
        assert_eq!(policy.actions[0].parameters["retention_days"], 90);
        set.validate().expect("valid toml policy");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            PolicyFormat::from_path(Path::new("policies.json")).unwrap(),
            PolicyFormat::Json
        );
        assert_eq!(
            PolicyFormat::from_path(Path::new("/etc/warden/POLICIES.TOML")).unwrap(),
            PolicyFormat::Toml
        );
        assert!(matches!(
            PolicyFormat::from_path(Path::new("policies.yaml")),
            Err(PolicyError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            PolicySet::from_json_str("{not json"),
            Err(PolicyError::Json(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let set = PolicySet::new(vec![
            Policy::admin_mfa_required(),
            Policy::admin_mfa_required(),
        ]);
        assert!(matches!(set.validate(), Err(PolicyError::DuplicateId(id)) if id == "admin-mfa-required"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let policy = Policy::new("  ", "Nameless", PolicyCategory::Data);
        assert!(matches!(
            validate_policy(&policy),
            Err(PolicyError::EmptyId { .. })
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let policy = policy_with(Condition::equals("user.shoeSize", 44));
        assert!(matches!(
            validate_policy(&policy),
            Err(PolicyError::UnknownField { field, .. }) if field == "user.shoeSize"
        ));
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let policy = policy_with(Condition::new(
            "user.role",
            Operator::Unknown("starts_with".to_string()),
            "ad",
        ));
        assert!(matches!(
            validate_policy(&policy),
            Err(PolicyError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_unknown_action_rejected() {
        let policy = Policy::new("p1", "Test", PolicyCategory::Identity)
            .with_action(Action::new(ActionType::Other("quarantine".to_string())));
        assert!(matches!(
            validate_policy(&policy),
            Err(PolicyError::UnknownAction { action, .. }) if action == "quarantine"
        ));
    }

    #[test]
    fn test_operand_shapes() {
        let bad = [
            Condition::new("network.threatLevel", Operator::GreaterThan, "high"),
            Condition::new("user.riskScore", Operator::InRange, 0.5),
            Condition::new("user.riskScore", Operator::InRange, vec![0.1]),
            Condition::new("user.riskScore", Operator::InRange, vec!["a", "b"]),
            Condition::in_range("user.riskScore", 0.9, 0.1),
            Condition::new("user.role", Operator::Regex, 5),
            Condition::new("user.role", Operator::Contains, serde_json::Value::Null),
        ];
        for condition in bad {
            let policy = policy_with(condition.clone());
            assert!(
                matches!(
                    validate_policy(&policy),
                    Err(PolicyError::InvalidOperand { .. })
                ),
                "expected invalid operand for {condition:?}"
            );
        }

        let good = [
            Condition::greater_than("network.threatLevel", 0.8),
            Condition::new("network.threatLevel", Operator::LessThan, "0.5"),
            Condition::in_range("user.riskScore", 0.1, 0.1),
            Condition::regex("network.ipAddress", r"^10\."),
            Condition::contains("user.groups", "ops"),
        ];
        for condition in good {
            validate_policy(&policy_with(condition)).expect("valid operand");
        }
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let policy = policy_with(Condition::regex("user.role", "(unclosed"));
        assert!(matches!(
            validate_policy(&policy),
            Err(PolicyError::InvalidRegex { .. })
        ));
    }
}
