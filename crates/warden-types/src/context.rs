//! Context sections for access evaluation.
//!
//! Six sections describe a single access request:
//! - **User**: identity, role, group membership, identity risk
//! - **Device**: management and compliance posture, stored device trust
//! - **Network**: origin address, VPN/corporate flags, threat level
//! - **Application**: the target application and its data classification
//! - **Session**: session age, elevation, step-up verification
//! - **Request**: the resource/action pair and its own risk estimate
//!
//! Field names serialize in camelCase so that a context document reads the
//! same way policy condition paths address it (`device.isManaged`,
//! `network.threatLevel`, ...).
//!
//! Every attribute of every section may be left out of a document. Absent
//! attributes deserialize to `None`, so a partially populated section still
//! loads and the missing values can be told apart from `false` or `0`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Data Classification
// ============================================================================

/// Sensitivity label of the data an application exposes.
///
/// Ordered from least to most sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataClassification {
    /// Freely shareable data.
    Public,
    /// Internal-only data.
    Internal,
    /// Business-confidential data.
    Confidential,
    /// Regulated or otherwise restricted data.
    Restricted,
}

impl DataClassification {
    /// Returns the wire name used in context documents and policy operands.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Confidential => "confidential",
            Self::Restricted => "restricted",
        }
    }
}

impl std::fmt::Display for DataClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// User
// ============================================================================

/// Identity attributes of the requesting principal.
///
/// Every attribute is optional; an attribute missing from the document
/// stays `None` and resolves as undefined during evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserContext {
    /// Stable user identifier.
    pub id: Option<String>,
    /// Role name (e.g., "admin", "user", "auditor").
    pub role: Option<String>,
    /// Group memberships.
    pub groups: Option<Vec<String>>,
    /// Identity risk in `[0, 1]`, higher is riskier.
    pub risk_score: Option<f64>,
    /// Time of the previous successful login.
    pub last_login: Option<DateTime<Utc>>,
    /// Whether the account has a second factor enrolled.
    pub mfa_enabled: Option<bool>,
}

impl UserContext {
    /// Creates a user with only an id and a role known.
    pub fn new(id: &str, role: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            role: Some(role.to_string()),
            ..Self::default()
        }
    }

    /// Sets the group memberships.
    pub fn with_groups(mut self, groups: &[&str]) -> Self {
        self.groups = Some(groups.iter().map(|g| (*g).to_string()).collect());
        self
    }

    /// Sets the identity risk score.
    pub fn with_risk_score(mut self, risk_score: f64) -> Self {
        self.risk_score = Some(risk_score);
        self
    }

    /// Sets the last login time.
    pub fn with_last_login(mut self, at: DateTime<Utc>) -> Self {
        self.last_login = Some(at);
        self
    }

    /// Sets whether MFA is enrolled.
    pub fn with_mfa_enabled(mut self, enabled: bool) -> Self {
        self.mfa_enabled = Some(enabled);
        self
    }
}

// ============================================================================
// Device
// ============================================================================

/// Posture of the device the request originates from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceContext {
    /// Device identifier from the inventory.
    pub id: Option<String>,
    /// Form factor (e.g., "laptop", "mobile", "server").
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    /// Operating system name.
    pub os: Option<String>,
    /// Enrolled in device management.
    pub is_managed: Option<bool>,
    /// Passed its last compliance scan.
    pub is_compliant: Option<bool>,
    /// Trust previously recorded for this device, in `[0, 1]`.
    pub trust_score: Option<f64>,
    /// Last time the inventory saw the device.
    pub last_seen: Option<DateTime<Utc>>,
}

impl DeviceContext {
    /// Creates a device with unknown posture and no stored trust.
    pub fn new(id: &str, device_type: &str, os: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            device_type: Some(device_type.to_string()),
            os: Some(os.to_string()),
            ..Self::default()
        }
    }

    /// Sets the managed flag.
    pub fn managed(mut self, is_managed: bool) -> Self {
        self.is_managed = Some(is_managed);
        self
    }

    /// Sets the compliant flag.
    pub fn compliant(mut self, is_compliant: bool) -> Self {
        self.is_compliant = Some(is_compliant);
        self
    }

    /// Sets the stored device trust score.
    pub fn with_trust_score(mut self, trust_score: f64) -> Self {
        self.trust_score = Some(trust_score);
        self
    }

    /// Sets the last-seen time.
    pub fn with_last_seen(mut self, at: DateTime<Utc>) -> Self {
        self.last_seen = Some(at);
        self
    }
}

// ============================================================================
// Network
// ============================================================================

/// Network origin of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkContext {
    /// Source IP address (kept as text; no parsing is required for evaluation).
    pub ip_address: Option<String>,
    /// Coarse location label (e.g., "US", "office-berlin").
    pub location: Option<String>,
    /// Request arrived through a VPN.
    #[serde(rename = "isVPN", alias = "isVpn")]
    pub is_vpn: Option<bool>,
    /// Request arrived from a corporate network.
    pub is_corporate: Option<bool>,
    /// Threat level of the origin network in `[0, 1]`.
    pub threat_level: Option<f64>,
}

impl NetworkContext {
    /// Creates an origin with only its address and location known.
    pub fn new(ip_address: &str, location: &str) -> Self {
        Self {
            ip_address: Some(ip_address.to_string()),
            location: Some(location.to_string()),
            ..Self::default()
        }
    }

    /// Sets the VPN flag.
    pub fn vpn(mut self, is_vpn: bool) -> Self {
        self.is_vpn = Some(is_vpn);
        self
    }

    /// Sets the corporate-network flag.
    pub fn corporate(mut self, is_corporate: bool) -> Self {
        self.is_corporate = Some(is_corporate);
        self
    }

    /// Sets the threat level.
    pub fn with_threat_level(mut self, threat_level: f64) -> Self {
        self.threat_level = Some(threat_level);
        self
    }
}

// ============================================================================
// Application
// ============================================================================

/// The application being accessed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationContext {
    /// Application identifier.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Classification of the data the application serves.
    pub data_classification: Option<DataClassification>,
    /// Whether access normally goes through an approval workflow.
    pub requires_approval: Option<bool>,
}

impl ApplicationContext {
    /// Creates an application with its identity and classification known.
    pub fn new(id: &str, name: &str, data_classification: DataClassification) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            data_classification: Some(data_classification),
            requires_approval: None,
        }
    }

    /// Sets the approval requirement.
    pub fn requiring_approval(mut self, requires_approval: bool) -> Self {
        self.requires_approval = Some(requires_approval);
        self
    }
}

// ============================================================================
// Session
// ============================================================================

/// The session the request belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionContext {
    /// Session identifier.
    pub id: Option<String>,
    /// When the session was established.
    pub start_time: Option<DateTime<Utc>>,
    /// Last activity observed on the session.
    pub last_activity: Option<DateTime<Utc>>,
    /// Session holds elevated privileges.
    pub is_elevated: Option<bool>,
    /// A second factor was verified during this session.
    pub mfa_verified: Option<bool>,
}

impl SessionContext {
    /// Creates a session started (and last active) at `at`.
    pub fn new(id: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: Some(id.to_string()),
            start_time: Some(at),
            last_activity: Some(at),
            ..Self::default()
        }
    }

    /// Sets the elevation flag.
    pub fn elevated(mut self, is_elevated: bool) -> Self {
        self.is_elevated = Some(is_elevated);
        self
    }

    /// Sets the MFA verification flag.
    pub fn mfa_verified(mut self, verified: bool) -> Self {
        self.mfa_verified = Some(verified);
        self
    }

    /// Sets the last activity time.
    pub fn with_last_activity(mut self, at: DateTime<Utc>) -> Self {
        self.last_activity = Some(at);
        self
    }
}

// ============================================================================
// Request
// ============================================================================

/// The operation being requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestContext {
    /// Resource identifier or path.
    pub resource: Option<String>,
    /// Action verb (e.g., "read", "write", "delete").
    pub action: Option<String>,
    /// When the request was made.
    pub timestamp: Option<DateTime<Utc>>,
    /// Risk estimate for this request in `[0, 1]`.
    pub risk_score: Option<f64>,
}

impl RequestContext {
    /// Creates a request with no risk estimate.
    pub fn new(resource: &str, action: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            resource: Some(resource.to_string()),
            action: Some(action.to_string()),
            timestamp: Some(timestamp),
            risk_score: None,
        }
    }

    /// Sets the request risk score.
    pub fn with_risk_score(mut self, risk_score: f64) -> Self {
        self.risk_score = Some(risk_score);
        self
    }
}

// ============================================================================
// Context
// ============================================================================

/// Complete snapshot evaluated by the engine for a single request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub user: Option<UserContext>,
    pub device: Option<DeviceContext>,
    pub network: Option<NetworkContext>,
    pub application: Option<ApplicationContext>,
    pub session: Option<SessionContext>,
    pub request: Option<RequestContext>,
}

impl Context {
    /// Creates an empty context (every section absent).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserContext) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_device(mut self, device: DeviceContext) -> Self {
        self.device = Some(device);
        self
    }

    pub fn with_network(mut self, network: NetworkContext) -> Self {
        self.network = Some(network);
        self
    }

    pub fn with_application(mut self, application: ApplicationContext) -> Self {
        self.application = Some(application);
        self
    }

    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }

    /// Whether the session has completed step-up verification.
    ///
    /// An absent session or an unset flag counts as unverified.
    pub fn session_mfa_verified(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.mfa_verified == Some(true))
    }
}

// ============================================================================
// Tests
// ============================================================================
