//! Policy definitions.
//!
//! A policy is a declarative rule: when every one of its conditions holds for
//! a request context, its actions are imposed on the request. Policies carry
//! a priority (higher is evaluated first) and an active flag; inactive
//! policies are never evaluated.
//!
//! The wire format is the camelCase document shape shared with the
//! administrative tooling:
//!
//! ```json
//! {
//!   "id": "admin-mfa-required",
//!   "name": "Admin MFA Required",
//!   "category": "identity",
//!   "conditions": [{ "field": "user.role", "operator": "equals", "value": "admin" }],
//!   "actions": [{ "type": "require_mfa", "parameters": {} }],
//!   "priority": 90,
//!   "active": true
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Category
// ============================================================================

/// The area of the request a policy is concerned with.
///
/// Informational only: evaluation never branches on the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyCategory {
    Device,
    Network,
    Identity,
    Application,
    Data,
    Location,
}

impl PolicyCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Network => "network",
            Self::Identity => "identity",
            Self::Application => "application",
            Self::Data => "data",
            Self::Location => "location",
        }
    }
}

impl std::fmt::Display for PolicyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Operator
// ============================================================================

/// Comparison applied by a condition.
///
/// Unknown operator names are preserved as [`Operator::Unknown`] instead of
/// failing to parse, and always evaluate to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// Strict, type-preserving equality.
    Equals,
    /// Strict inequality of a present value.
    NotEquals,
    /// Substring test on the text forms of both operands.
    Contains,
    /// Negated substring test.
    NotContains,
    /// Numeric `>`.
    GreaterThan,
    /// Numeric `<`.
    LessThan,
    /// Numeric inclusive range; the operand is `[min, max]`.
    InRange,
    /// Regular-expression match against the text form of the field.
    Regex,
    /// An operator name this engine does not implement.
    Unknown(String),
}

impl Operator {
    /// Returns the wire name of the operator.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::InRange => "in_range",
            Self::Regex => "regex",
            Self::Unknown(name) => name,
        }
    }
}

impl From<String> for Operator {
    fn from(name: String) -> Self {
        match name.as_str() {
            "equals" => Self::Equals,
            "not_equals" => Self::NotEquals,
            "contains" => Self::Contains,
            "not_contains" => Self::NotContains,
            "greater_than" => Self::GreaterThan,
            "less_than" => Self::LessThan,
            "in_range" => Self::InRange,
            "regex" => Self::Regex,
            _ => Self::Unknown(name),
        }
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Logical Operator
// ============================================================================

/// Combinator carried on a condition in the document shape.
///
/// Parsed and written back, but not consulted: the conditions of a policy
/// are always AND-ed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[serde(alias = "and")]
    And,
    #[serde(alias = "or")]
    Or,
}

// ============================================================================
// Condition
// ============================================================================

/// A single predicate over a context field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Dot-delimited path into the context (e.g., `device.isManaged`).
    pub field: String,
    /// Comparison to apply.
    pub operator: Operator,
    /// Operand. Its expected shape depends on the operator.
    #[serde(default)]
    pub value: Value,
    /// See [`LogicalOperator`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<LogicalOperator>,
}

impl Condition {
    /// Creates a condition with an arbitrary operator and operand.
    pub fn new(field: &str, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value: value.into(),
            logical_operator: None,
        }
    }

    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Equals, value)
    }

    pub fn not_equals(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::NotEquals, value)
    }

    pub fn contains(field: &str, needle: &str) -> Self {
        Self::new(field, Operator::Contains, needle)
    }

    pub fn not_contains(field: &str, needle: &str) -> Self {
        Self::new(field, Operator::NotContains, needle)
    }

    pub fn greater_than(field: &str, bound: f64) -> Self {
        Self::new(field, Operator::GreaterThan, bound)
    }

    pub fn less_than(field: &str, bound: f64) -> Self {
        Self::new(field, Operator::LessThan, bound)
    }

    /// Inclusive numeric range `[min, max]`.
    pub fn in_range(field: &str, min: f64, max: f64) -> Self {
        Self::new(field, Operator::InRange, vec![min, max])
    }

    pub fn regex(field: &str, pattern: &str) -> Self {
        Self::new(field, Operator::Regex, pattern)
    }

    /// Attaches a logical operator to the condition (kept for round-tripping).
    pub fn with_logical_operator(mut self, op: LogicalOperator) -> Self {
        self.logical_operator = Some(op);
        self
    }
}

// ============================================================================
// Action
// ============================================================================

/// Kind of directive an action imposes.
///
/// Unknown kinds are preserved verbatim as [`ActionType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    Allow,
    Deny,
    RequireMfa,
    RequireApproval,
    LimitAccess,
    Monitor,
    StepUpAuth,
    Other(String),
}

impl ActionType {
    /// Returns the wire name of the action type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::RequireMfa => "require_mfa",
            Self::RequireApproval => "require_approval",
            Self::LimitAccess => "limit_access",
            Self::Monitor => "monitor",
            Self::StepUpAuth => "step_up_auth",
            Self::Other(name) => name,
        }
    }

    /// Whether this action makes a decision conditional on remediation.
    pub fn requires_remediation(&self) -> bool {
        matches!(
            self,
            Self::RequireMfa | Self::RequireApproval | Self::StepUpAuth
        )
    }

    /// Human-readable phrase describing the requirement this action imposes.
    pub fn requirement_phrase(&self) -> String {
        match self {
            Self::RequireMfa => "Multi-factor authentication required".to_string(),
            Self::RequireApproval => "Manager approval required".to_string(),
            Self::StepUpAuth => "Additional authentication required".to_string(),
            Self::LimitAccess => "Limited access permissions".to_string(),
            Self::Monitor => "Enhanced monitoring enabled".to_string(),
            other => format!("{} required", other.as_str()),
        }
    }
}

impl From<String> for ActionType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "allow" => Self::Allow,
            "deny" => Self::Deny,
            "require_mfa" => Self::RequireMfa,
            "require_approval" => Self::RequireApproval,
            "limit_access" => Self::LimitAccess,
            "monitor" => Self::Monitor,
            "step_up_auth" => Self::StepUpAuth,
            _ => Self::Other(name),
        }
    }
}

impl From<ActionType> for String {
    fn from(action: ActionType) -> Self {
        match action {
            ActionType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remediation or decision-influencing directive.
///
/// `parameters` are opaque to the engine; they are interpreted by whoever
/// carries out the remediation. A sorted map keeps their serialized form
/// stable, which deduplication relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

impl Action {
    /// Creates an action with no parameters.
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            parameters: BTreeMap::new(),
        }
    }

    /// Adds a parameter (builder pattern).
    pub fn with_parameter(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    /// Identity used for deduplication: the action type plus the serialized
    /// parameters.
    pub fn dedup_key(&self) -> (String, String) {
        let params = serde_json::to_string(&self.parameters).unwrap_or_default();
        (self.action_type.as_str().to_string(), params)
    }
}

/// Removes actions whose (type, parameters) pair was already seen.
///
/// The first occurrence wins and relative order is preserved.
pub fn dedup_actions(actions: Vec<Action>) -> Vec<Action> {
    let mut seen = std::collections::HashSet::with_capacity(actions.len());
    actions
        .into_iter()
        .filter(|action| seen.insert(action.dedup_key()))
        .collect()
}

// ============================================================================
// Policy
// ============================================================================

/// A declarative access policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Unique identifier, reported in `appliedPolicies`.
    pub id: String,
    /// Display name, used in reasoning and compliance violations.
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub category: PolicyCategory,
    /// AND-ed conditions. Empty means the policy always applies.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Higher values are evaluated first.
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Policy {
    /// Creates an active, priority-0 policy with no conditions or actions.
    pub fn new(id: &str, name: &str, category: PolicyCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            category,
            conditions: Vec::new(),
            actions: Vec::new(),
            priority: 0,
            active: true,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Whether any of this policy's actions has the given type.
    pub fn has_action(&self, action_type: &ActionType) -> bool {
        self.actions.iter().any(|a| &a.action_type == action_type)
    }

    /// Whether this policy denies outright.
    pub fn denies(&self) -> bool {
        self.has_action(&ActionType::Deny)
    }

    /// Whether this policy requires remediation before access.
    pub fn requires_remediation(&self) -> bool {
        self.actions
            .iter()
            .any(|a| a.action_type.requires_remediation())
    }

    // ------------------------------------------------------------------------
    // Seed policies
    // ------------------------------------------------------------------------

    /// Administrators must complete multi-factor authentication.
    pub fn admin_mfa_required() -> Self {
        Self::new("admin-mfa-required", "Admin MFA Required", PolicyCategory::Identity)
            .with_description("Require multi-factor authentication for administrative users")
            .with_condition(Condition::equals("user.role", "admin"))
            .with_action(Action::new(ActionType::RequireMfa))
            .with_priority(90)
    }

    /// Unmanaged devices get restricted access pending approval.
    pub fn unmanaged_device_restriction() -> Self {
        Self::new(
            "unmanaged-device-restriction",
            "Unmanaged Device Restriction",
            PolicyCategory::Device,
        )
        .with_description("Limit access from devices outside device management")
        .with_condition(Condition::equals("device.isManaged", false))
        .with_action(Action::new(ActionType::LimitAccess).with_parameter("scope", "read_only"))
        .with_action(Action::new(ActionType::RequireApproval))
        .with_priority(80)
    }

    /// Requests from high-threat networks are blocked.
    pub fn high_risk_network_block() -> Self {
        Self::new(
            "high-risk-network-block",
            "High Risk Network Block",
            PolicyCategory::Network,
        )
        .with_description("Block access from networks with an elevated threat level")
        .with_condition(Condition::greater_than("network.threatLevel", 0.8))
        .with_action(Action::new(ActionType::Deny))
        .with_priority(100)
    }

    /// Confidential data requires step-up authentication.
    pub fn confidential_data_step_up() -> Self {
        Self::new(
            "confidential-data-step-up",
            "Confidential Data Step-Up",
            PolicyCategory::Data,
        )
        .with_description("Require step-up authentication for confidential applications")
        .with_condition(Condition::equals(
            "application.dataClassification",
            "confidential",
        ))
        .with_action(Action::new(ActionType::StepUpAuth))
        .with_priority(70)
    }
}

// ============================================================================
// Policy Set
// ============================================================================

/// An ordered collection of policies, as loaded from a policy document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySet {
    pub policies: Vec<Policy>,
}

impl PolicySet {
    pub fn new(policies: Vec<Policy>) -> Self {
        Self { policies }
    }

    /// The built-in illustrative policies used when no policy document is
    /// supplied.
    pub fn seed() -> Self {
        Self::new(vec![
            Policy::admin_mfa_required(),
            Policy::unmanaged_device_restriction(),
            Policy::high_risk_network_block(),
            Policy::confidential_data_step_up(),
        ])
    }

    /// Appends policies from another set (builder pattern).
    pub fn extend(mut self, other: PolicySet) -> Self {
        self.policies.extend(other.policies);
        self
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Policy> {
        self.policies.iter()
    }

    /// Looks up a policy by id.
    pub fn get(&self, id: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.id == id)
    }

    pub fn as_slice(&self) -> &[Policy] {
        &self.policies
    }

    /// Every policy, highest priority first. See [`by_priority`].
    pub fn by_priority(&self) -> Vec<&Policy> {
        by_priority(&self.policies)
    }

    /// The active policies in evaluation order. See [`evaluation_order`].
    pub fn evaluation_order(&self) -> Vec<&Policy> {
        evaluation_order(&self.policies)
    }
}

/// Policies sorted by descending priority; equal priorities keep input order.
pub fn by_priority(policies: &[Policy]) -> Vec<&Policy> {
    let mut ordered: Vec<&Policy> = policies.iter().collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
    ordered
}

/// The active policies, in the order the decision engine considers them.
pub fn evaluation_order(policies: &[Policy]) -> Vec<&Policy> {
    by_priority(policies)
        .into_iter()
        .filter(|p| p.active)
        .collect()
}

impl<'a> IntoIterator for &'a PolicySet {
    type Item = &'a Policy;
    type IntoIter = std::slice::Iter<'a, Policy>;

    fn into_iter(self) -> Self::IntoIter {
        self.policies.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
