//! # warden-engine: Zero-trust access decisions
//!
//! Given a [`Context`](warden_types::Context) snapshot and a set of
//! [`Policy`](warden_policy::Policy) rules, the engine answers three
//! questions:
//!
//! - **How much do we trust this request?** [`calculate_trust_score`]
//!   combines user, device, network and situational sub-scores.
//! - **May it proceed?** [`evaluate_access`] resolves applicable policies in
//!   priority order into an [`AccessDecision`]: `allow`, `conditional`
//!   (with required remediation) or `deny`.
//! - **Does a live session still comply?** [`perform_continuous_compliance`]
//!   detects MFA requirements that were never satisfied.
//!
//! Every operation is a pure function of its inputs and the current time;
//! none of them fails. Incomplete contexts degrade to base scores and
//! non-matching conditions.
//!
//! ## Examples
//!
//! ```
//! use warden_engine::{evaluate_access, Verdict};
//! use warden_policy::PolicySet;
//! use warden_types::{Context, NetworkContext};
//!
//! let context = Context::new()
//!     .with_network(NetworkContext::new("198.51.100.7", "unknown").with_threat_level(0.9));
//!
//! let decision = evaluate_access(&context, PolicySet::seed().as_slice());
//! assert_eq!(decision.decision, Verdict::Deny);
//! assert_eq!(decision.applied_policies, ["high-risk-network-block"]);
//! ```

pub mod compliance;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod trust;

pub use compliance::{ComplianceResult, ComplianceViolation};
pub use config::{ConfidenceModel, DecisionThresholds, EngineConfig, TrustWeights};
pub use decision::{AccessDecision, Verdict};
pub use engine::{AccessEngine, calculate_trust_score, evaluate_access, perform_continuous_compliance};
pub use error::{EngineError, Result};
pub use trust::{TrustFactor, TrustScore};
