//! Trust score calculation.
//!
//! Four independent dimensions are scored from the request context, each
//! clamped to `[0, 1]` after its adjustments, and combined into a weighted
//! overall score. Absent context sections score at their base value; an
//! absent attribute skips the adjustment it feeds.
//!
//! | Dimension | Base | Adjustments |
//! |-----------|------|-------------|
//! | user      | 0.5  | role, MFA enrollment, `(1 - riskScore) * 0.3`, login recency |
//! | device    | 0.3  | managed, compliant, averaged with stored trust, last seen |
//! | network   | 0.5  | corporate, VPN, `- threatLevel * 0.4` |
//! | context   | 0.5  | session MFA/elevation, business hours, data classification, `- request.riskScore * 0.2` |

use crate::config::TrustWeights;
use chrono::{DateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};
use warden_types::{
    ApplicationContext, Context, DataClassification, DeviceContext, NetworkContext,
    RequestContext, SessionContext, UserContext,
};

const USER_BASE: f64 = 0.5;
const DEVICE_BASE: f64 = 0.3;
const NETWORK_BASE: f64 = 0.5;
const CONTEXT_BASE: f64 = 0.5;

/// Inclusive UTC hour window counted as business hours.
const BUSINESS_HOURS: std::ops::RangeInclusive<u32> = 9..=17;

// ============================================================================
// Trust Score
// ============================================================================

/// Explainability record for one scored dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustFactor {
    pub name: String,
    pub score: f64,
    pub weight: f64,
    pub reason: String,
}

/// Composite trust score of a request context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustScore {
    pub overall: f64,
    pub user: f64,
    pub device: f64,
    pub network: f64,
    pub context: f64,
    /// One entry per dimension, in the order user, device, network, context.
    pub factors: Vec<TrustFactor>,
}

impl TrustScore {
    /// Scores `context` as of `now`.
    pub fn compute(context: &Context, weights: &TrustWeights, now: DateTime<Utc>) -> Self {
        let user = user_score(context.user.as_ref(), now);
        let device = device_score(context.device.as_ref(), now);
        let network = network_score(context.network.as_ref());
        let situational = situational_score(
            context.session.as_ref(),
            context.request.as_ref(),
            context.application.as_ref(),
        );

        let overall = clamp_unit(
            user * weights.user
                + device * weights.device
                + network * weights.network
                + situational * weights.context,
        );

        let factors = vec![
            factor(
                "user",
                user,
                weights.user,
                "Identity assurance from role, MFA enrollment, risk and login recency",
            ),
            factor(
                "device",
                device,
                weights.device,
                "Device management, compliance posture and stored device trust",
            ),
            factor(
                "network",
                network,
                weights.network,
                "Network origin, VPN usage and observed threat level",
            ),
            factor(
                "context",
                situational,
                weights.context,
                "Session assurance, time of access, data sensitivity and request risk",
            ),
        ];

        Self {
            overall,
            user,
            device,
            network,
            context: situational,
            factors,
        }
    }
}

fn factor(name: &str, score: f64, weight: f64, reason: &str) -> TrustFactor {
    TrustFactor {
        name: name.to_string(),
        score,
        weight,
        reason: reason.to_string(),
    }
}

// ============================================================================
// Dimensions
// ============================================================================

/// Identity dimension.
///
/// `role = "user"` earns a larger bonus than `role = "admin"`; administrators
/// are the more valuable target.
pub fn user_score(user: Option<&UserContext>, now: DateTime<Utc>) -> f64 {
    let Some(user) = user else {
        return USER_BASE;
    };

    let mut score = USER_BASE;
    score += match user.role.as_deref() {
        Some("admin") => 0.1,
        Some("user") => 0.2,
        _ => 0.0,
    };
    if user.mfa_enabled == Some(true) {
        score += 0.2;
    }
    if let Some(risk_score) = user.risk_score {
        score += (1.0 - risk(risk_score)) * 0.3;
    }

    if let Some(last_login) = user.last_login {
        let age = now - last_login;
        if age < TimeDelta::days(1) {
            score += 0.1;
        } else if age > TimeDelta::days(30) {
            score -= 0.1;
        }
    }

    clamp_unit(score)
}

/// Device dimension.
pub fn device_score(device: Option<&DeviceContext>, now: DateTime<Utc>) -> f64 {
    let Some(device) = device else {
        return DEVICE_BASE;
    };

    let mut score = DEVICE_BASE;
    if device.is_managed == Some(true) {
        score += 0.4;
    }
    if device.is_compliant == Some(true) {
        score += 0.3;
    }
    if let Some(stored) = device.trust_score {
        score = (score + trust(stored)) / 2.0;
    }

    if let Some(last_seen) = device.last_seen {
        let age = now - last_seen;
        if age < TimeDelta::hours(24) {
            score += 0.1;
        } else if age > TimeDelta::hours(168) {
            score -= 0.1;
        }
    }

    clamp_unit(score)
}

/// Network dimension.
pub fn network_score(network: Option<&NetworkContext>) -> f64 {
    let Some(network) = network else {
        return NETWORK_BASE;
    };

    let mut score = NETWORK_BASE;
    if network.is_corporate == Some(true) {
        score += 0.3;
    }
    // The VPN adjustment needs both flags known
    match (network.is_vpn, network.is_corporate) {
        (Some(true), Some(true)) => score += 0.1,
        (Some(true), Some(false)) => score -= 0.2,
        _ => {}
    }
    if let Some(threat_level) = network.threat_level {
        score -= risk(threat_level) * 0.4;
    }

    clamp_unit(score)
}

/// Situational dimension: session, time of access, data sensitivity.
pub fn situational_score(
    session: Option<&SessionContext>,
    request: Option<&RequestContext>,
    application: Option<&ApplicationContext>,
) -> f64 {
    let mut score = CONTEXT_BASE;

    if let Some(session) = session {
        if session.mfa_verified == Some(true) {
            score += 0.2;
        }
        if session.is_elevated == Some(true) {
            score += 0.1;
        }
    }

    if let Some(request) = request {
        if request
            .timestamp
            .is_some_and(|at| BUSINESS_HOURS.contains(&at.hour()))
        {
            score += 0.1;
        }
        if let Some(risk_score) = request.risk_score {
            score -= risk(risk_score) * 0.2;
        }
    }

    match application.and_then(|a| a.data_classification) {
        Some(DataClassification::Public) => score += 0.1,
        Some(DataClassification::Restricted) => score -= 0.1,
        _ => {}
    }

    clamp_unit(score)
}

// ============================================================================
// Input Sanitization
// ============================================================================

/// Risk-like inputs (higher is worse). Non-finite values count as maximal risk.
fn risk(value: f64) -> f64 {
    if value.is_finite() { value } else { 1.0 }
}

/// Trust-like inputs (higher is better). Non-finite values count as no trust.
fn trust(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 12, 10, 0, 0).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_context_scores_base_values() {
        let score = TrustScore::compute(&Context::new(), &TrustWeights::default(), now());
        assert!(approx(score.user, 0.5));
        assert!(approx(score.device, 0.3));
        assert!(approx(score.network, 0.5));
        assert!(approx(score.context, 0.5));
        assert!(approx(score.overall, 0.44));
    }

    #[test]
    fn test_factors_mirror_sub_scores() {
        let weights = TrustWeights::default();
        let score = TrustScore::compute(&Context::new(), &weights, now());
        let names: Vec<_> = score.factors.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["user", "device", "network", "context"]);
        assert!(approx(score.factors[1].score, score.device));
        assert!(approx(score.factors[1].weight, weights.device));
        assert!(score.factors.iter().all(|f| !f.reason.is_empty()));
    }

    #[test_case("user", 0.2 ; "plain user bonus")]
    #[test_case("admin", 0.1 ; "admin bonus")]
    #[test_case("guest", 0.0 ; "other roles")]
    fn test_role_bonus(role: &str, bonus: f64) {
        // risk 1.0 removes the risk term so only the role bonus remains
        let user = UserContext::new("u", role).with_risk_score(1.0);
        assert!(approx(user_score(Some(&user), now()), 0.5 + bonus));
    }

    #[test]
    fn test_plain_user_outscores_admin() {
        let user = UserContext::new("u", "user");
        let admin = UserContext::new("a", "admin");
        assert!(user_score(Some(&user), now()) > user_score(Some(&admin), now()));
    }

    #[test]
    fn test_login_recency() {
        let base = UserContext::new("u", "guest").with_risk_score(1.0);
        let recent = base.clone().with_last_login(now() - TimeDelta::hours(2));
        let stale = base.clone().with_last_login(now() - TimeDelta::days(45));
        let middling = base.clone().with_last_login(now() - TimeDelta::days(10));

        assert!(approx(user_score(Some(&recent), now()), 0.6));
        assert!(approx(user_score(Some(&stale), now()), 0.4));
        assert!(approx(user_score(Some(&middling), now()), 0.5));
    }

    #[test]
    fn test_device_averages_with_stored_trust() {
        let device = DeviceContext::new("d", "laptop", "linux")
            .managed(true)
            .compliant(true)
            .with_trust_score(0.6);
        // (0.3 + 0.4 + 0.3 + 0.6) / 2
        assert!(approx(device_score(Some(&device), now()), 0.8));
    }

    #[test]
    fn test_device_last_seen() {
        let device = DeviceContext::new("d", "phone", "ios").with_trust_score(0.3);
        let fresh = device.clone().with_last_seen(now() - TimeDelta::hours(1));
        let gone = device.clone().with_last_seen(now() - TimeDelta::hours(200));

        assert!(approx(device_score(Some(&device), now()), 0.3));
        assert!(approx(device_score(Some(&fresh), now()), 0.4));
        assert!(approx(device_score(Some(&gone), now()), 0.2));
    }

    #[test_case(false, false, 0.5 ; "public network")]
    #[test_case(false, true, 0.8 ; "corporate network")]
    #[test_case(true, true, 0.9 ; "corporate vpn")]
    #[test_case(true, false, 0.3 ; "consumer vpn")]
    fn test_network_origin(vpn: bool, corporate: bool, expected: f64) {
        let network = NetworkContext::new("203.0.113.9", "NL")
            .vpn(vpn)
            .corporate(corporate);
        assert!(approx(network_score(Some(&network)), expected));
    }

    #[test]
    fn test_network_threat_penalty() {
        let network = NetworkContext::new("203.0.113.9", "NL").with_threat_level(0.5);
        assert!(approx(network_score(Some(&network)), 0.3));
    }

    #[test_case(9, 0.6 ; "opening hour")]
    #[test_case(17, 0.6 ; "closing hour inclusive")]
    #[test_case(18, 0.5 ; "evening")]
    #[test_case(3, 0.5 ; "night")]
    fn test_business_hours(hour: u32, expected: f64) {
        let at = Utc.with_ymd_and_hms(2025, 3, 12, hour, 30, 0).unwrap();
        let request = RequestContext::new("/reports", "read", at);
        assert!(approx(situational_score(None, Some(&request), None), expected));
    }

    #[test]
    fn test_situational_adjustments() {
        let session = SessionContext::new("s", now())
            .mfa_verified(true)
            .elevated(true);
        let request = RequestContext::new("/hr", "write", Utc.with_ymd_and_hms(2025, 3, 12, 22, 0, 0).unwrap())
            .with_risk_score(0.5);
        let restricted = ApplicationContext::new("a", "hr", DataClassification::Restricted);
        let public = ApplicationContext::new("b", "wiki", DataClassification::Public);

        // 0.5 + 0.2 + 0.1 - 0.1 - 0.1
        assert!(approx(
            situational_score(Some(&session), Some(&request), Some(&restricted)),
            0.6
        ));
        assert!(approx(situational_score(None, None, Some(&public)), 0.6));
    }

    #[test]
    fn test_sub_scores_are_clamped() {
        let user = UserContext::new("u", "user")
            .with_mfa_enabled(true)
            .with_risk_score(0.0)
            .with_last_login(now());
        assert!(approx(user_score(Some(&user), now()), 1.0));

        let network = NetworkContext::new("198.51.100.1", "??")
            .vpn(true)
            .corporate(false)
            .with_threat_level(1.0);
        assert!(approx(network_score(Some(&network)), 0.0));
    }

    #[test]
    fn test_non_finite_inputs_score_as_least_trust() {
        let user = UserContext::new("u", "guest").with_risk_score(f64::NAN);
        assert!(approx(user_score(Some(&user), now()), 0.5));

        let device = DeviceContext::new("d", "laptop", "linux").with_trust_score(f64::INFINITY);
        assert!(approx(device_score(Some(&device), now()), 0.15));

        let network = NetworkContext::new("10.0.0.1", "HQ").with_threat_level(f64::NAN);
        assert!(approx(network_score(Some(&network)), 0.1));
    }

    #[test]
    fn test_absent_attributes_skip_adjustments() {
        let context: Context = serde_json::from_str(
            r#"{
                "user": {"id": "u"},
                "device": {"id": "d", "isManaged": true},
                "network": {"threatLevel": 0.5},
                "request": {"action": "read"}
            }"#,
        )
        .expect("partial context");

        let score = TrustScore::compute(&context, &TrustWeights::default(), now());
        // No role, MFA flag, risk or login: base only
        assert!(approx(score.user, 0.5));
        // Managed bonus applies; no stored trust to average with
        assert!(approx(score.device, 0.7));
        // Only the threat penalty
        assert!(approx(score.network, 0.3));
        // No timestamp, no request risk
        assert!(approx(score.context, 0.5));
    }

    #[test]
    fn test_vpn_with_unknown_network_kind() {
        let network = NetworkContext::new("203.0.113.9", "NL").vpn(true);
        assert!(approx(network_score(Some(&network)), 0.5));
    }

    #[test]
    fn test_custom_weights() {
        let weights = TrustWeights {
            user: 0.0,
            device: 1.0,
            network: 0.0,
            context: 0.0,
        };
        let score = TrustScore::compute(&Context::new(), &weights, now());
        assert!(approx(score.overall, 0.3));
    }
}
