//! # warden-policy: Declarative access policies
//!
//! Policies describe when a request needs remediation (or must be refused)
//! in terms of the request [`Context`](warden_types::Context). This crate
//! owns the policy data model, the typed field accessor table, the condition
//! evaluator, and policy-document parsing/validation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Policy                                      │
//! │  id · name · category · priority · active    │
//! │  conditions (AND-ed) · actions               │
//! └─────────────────┬───────────────────────────┘
//!                   │  condition.field
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Field table                                 │
//! │  "device.isManaged" → extractor(&Context)    │
//! └─────────────────┬───────────────────────────┘
//!                   │  FieldValue
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Condition evaluator                         │
//! │  equals · contains · greater_than · in_range │
//! │  regex · ... → bool (never an error)         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Seed Policies
//!
//! [`PolicySet::seed`] returns the four built-in illustrative policies:
//!
//! - **admin-mfa-required**: administrators must complete MFA
//! - **unmanaged-device-restriction**: unmanaged devices get limited access pending approval
//! - **high-risk-network-block**: networks with threat level above 0.8 are denied
//! - **confidential-data-step-up**: confidential applications require step-up authentication
//!
//! ## Examples
//!
//! ```
//! use warden_policy::{evaluator, Condition, Policy, PolicyCategory};
//! use warden_types::{Context, DeviceContext};
//!
//! let policy = Policy::new("managed-only", "Managed only", PolicyCategory::Device)
//!     .with_condition(Condition::equals("device.isManaged", false));
//!
//! let unmanaged = DeviceContext::new("d-1", "laptop", "linux").managed(false);
//! assert!(evaluator::policy_applies(&policy, &Context::new().with_device(unmanaged)));
//!
//! // Missing sections and unset attributes never match.
//! assert!(!evaluator::policy_applies(&policy, &Context::new()));
//! let unknown = DeviceContext::new("d-2", "laptop", "linux");
//! assert!(!evaluator::policy_applies(&policy, &Context::new().with_device(unknown)));
//! ```

pub mod document;
pub mod error;
pub mod evaluator;
pub mod fields;
pub mod policy;

pub use document::{PolicyFormat, validate_policy};
pub use error::PolicyError;
pub use evaluator::{evaluate_condition, policy_applies};
pub use fields::FieldValue;
pub use policy::{
    Action, ActionType, Condition, LogicalOperator, Operator, Policy, PolicyCategory, PolicySet,
    by_priority, dedup_actions, evaluation_order,
};
