//! Typed field lookup into a request [`Context`].
//!
//! Condition paths such as `device.isManaged` are resolved through a fixed
//! table that maps each path to an extractor function. Paths that are not in
//! the table, and paths whose section (or optional value) is absent from the
//! context, resolve to [`FieldValue::Undefined`].

use chrono::{DateTime, Utc};
use warden_types::{Context, DataClassification};

/// The value found at a context path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Path unknown, section absent, or optional value unset.
    Undefined,
    Bool(bool),
    Number(f64),
    Text(&'a str),
    List(&'a [String]),
    Timestamp(DateTime<Utc>),
}

impl FieldValue<'_> {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

type Extractor = for<'a> fn(&'a Context) -> FieldValue<'a>;

fn text(value: Option<&str>) -> FieldValue<'_> {
    value.map_or(FieldValue::Undefined, FieldValue::Text)
}

fn flag(value: Option<bool>) -> FieldValue<'static> {
    value.map_or(FieldValue::Undefined, FieldValue::Bool)
}

fn number(value: Option<f64>) -> FieldValue<'static> {
    value.map_or(FieldValue::Undefined, FieldValue::Number)
}

fn list(value: Option<&[String]>) -> FieldValue<'_> {
    value.map_or(FieldValue::Undefined, FieldValue::List)
}

fn timestamp(value: Option<DateTime<Utc>>) -> FieldValue<'static> {
    value.map_or(FieldValue::Undefined, FieldValue::Timestamp)
}

/// Every addressable context path, with its extractor.
static FIELDS: &[(&str, Extractor)] = &[
    // -- User --
    ("user.id", |c| text(c.user.as_ref().and_then(|u| u.id.as_deref()))),
    ("user.role", |c| text(c.user.as_ref().and_then(|u| u.role.as_deref()))),
    ("user.groups", |c| list(c.user.as_ref().and_then(|u| u.groups.as_deref()))),
    ("user.riskScore", |c| number(c.user.as_ref().and_then(|u| u.risk_score))),
    ("user.lastLogin", |c| timestamp(c.user.as_ref().and_then(|u| u.last_login))),
    ("user.mfaEnabled", |c| flag(c.user.as_ref().and_then(|u| u.mfa_enabled))),
    // -- Device --
    ("device.id", |c| text(c.device.as_ref().and_then(|d| d.id.as_deref()))),
    ("device.type", |c| {
        text(c.device.as_ref().and_then(|d| d.device_type.as_deref()))
    }),
    ("device.os", |c| text(c.device.as_ref().and_then(|d| d.os.as_deref()))),
    ("device.isManaged", |c| flag(c.device.as_ref().and_then(|d| d.is_managed))),
    ("device.isCompliant", |c| {
        flag(c.device.as_ref().and_then(|d| d.is_compliant))
    }),
    ("device.trustScore", |c| {
        number(c.device.as_ref().and_then(|d| d.trust_score))
    }),
    ("device.lastSeen", |c| {
        timestamp(c.device.as_ref().and_then(|d| d.last_seen))
    }),
    // -- Network --
    ("network.ipAddress", |c| {
        text(c.network.as_ref().and_then(|n| n.ip_address.as_deref()))
    }),
    ("network.location", |c| {
        text(c.network.as_ref().and_then(|n| n.location.as_deref()))
    }),
    ("network.isVPN", |c| flag(c.network.as_ref().and_then(|n| n.is_vpn))),
    ("network.isCorporate", |c| {
        flag(c.network.as_ref().and_then(|n| n.is_corporate))
    }),
    ("network.threatLevel", |c| {
        number(c.network.as_ref().and_then(|n| n.threat_level))
    }),
    // -- Application --
    ("application.id", |c| {
        text(c.application.as_ref().and_then(|a| a.id.as_deref()))
    }),
    ("application.name", |c| {
        text(c.application.as_ref().and_then(|a| a.name.as_deref()))
    }),
    ("application.dataClassification", |c| {
        text(
            c.application
                .as_ref()
                .and_then(|a| a.data_classification)
                .map(DataClassification::as_str),
        )
    }),
    ("application.requiresApproval", |c| {
        flag(c.application.as_ref().and_then(|a| a.requires_approval))
    }),
    // -- Session --
    ("session.id", |c| text(c.session.as_ref().and_then(|s| s.id.as_deref()))),
    ("session.startTime", |c| {
        timestamp(c.session.as_ref().and_then(|s| s.start_time))
    }),
    ("session.lastActivity", |c| {
        timestamp(c.session.as_ref().and_then(|s| s.last_activity))
    }),
    ("session.isElevated", |c| {
        flag(c.session.as_ref().and_then(|s| s.is_elevated))
    }),
    ("session.mfaVerified", |c| {
        flag(c.session.as_ref().and_then(|s| s.mfa_verified))
    }),
    // -- Request --
    ("request.resource", |c| {
        text(c.request.as_ref().and_then(|r| r.resource.as_deref()))
    }),
    ("request.action", |c| {
        text(c.request.as_ref().and_then(|r| r.action.as_deref()))
    }),
    ("request.timestamp", |c| {
        timestamp(c.request.as_ref().and_then(|r| r.timestamp))
    }),
    ("request.riskScore", |c| {
        number(c.request.as_ref().and_then(|r| r.risk_score))
    }),
];

/// Resolves a dot-delimited path against the context.
///
/// Never fails: unknown or absent paths yield [`FieldValue::Undefined`].
pub fn resolve<'a>(context: &'a Context, path: &str) -> FieldValue<'a> {
    FIELDS
        .iter()
        .find(|(name, _)| *name == path)
        .map_or(FieldValue::Undefined, |(_, extract)| extract(context))
}

/// Whether `path` names a field in the accessor table.
pub fn is_known_field(path: &str) -> bool {
    FIELDS.iter().any(|(name, _)| *name == path)
}

/// All addressable paths, in table order.
pub fn known_fields() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|(name, _)| *name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use warden_types::{ApplicationContext, DeviceContext, NetworkContext, UserContext};

    fn sample_context() -> Context {
        Context::new()
            .with_user(UserContext::new("u-1", "admin").with_groups(&["ops", "sre"]))
            .with_device(DeviceContext::new("d-1", "laptop", "linux").managed(true))
            .with_network(NetworkContext::new("10.1.2.3", "US").with_threat_level(0.25))
            .with_application(ApplicationContext::new(
                "a-1",
                "ledger",
                DataClassification::Restricted,
            ))
    }

    #[test]
    fn test_resolve_scalar_fields() {
        let context = sample_context();
        assert_eq!(resolve(&context, "user.role"), FieldValue::Text("admin"));
        assert_eq!(resolve(&context, "device.isManaged"), FieldValue::Bool(true));
        assert_eq!(
            resolve(&context, "network.threatLevel"),
            FieldValue::Number(0.25)
        );
        assert_eq!(
            resolve(&context, "application.dataClassification"),
            FieldValue::Text("restricted")
        );
    }

    #[test]
    fn test_resolve_list_field() {
        let context = sample_context();
        match resolve(&context, "user.groups") {
            FieldValue::List(groups) => assert_eq!(groups, ["ops", "sre"]),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_section_is_undefined() {
        let context = sample_context();
        assert!(resolve(&context, "session.mfaVerified").is_undefined());
        assert!(resolve(&context, "request.riskScore").is_undefined());
    }

    #[test]
    fn test_unset_optional_value_is_undefined() {
        let context = sample_context();
        assert!(resolve(&context, "user.lastLogin").is_undefined());

        let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 0, 0).unwrap();
        let context = Context::new().with_user(UserContext::new("u", "user").with_last_login(at));
        assert_eq!(resolve(&context, "user.lastLogin"), FieldValue::Timestamp(at));
    }

    #[test]
    fn test_unset_attribute_in_present_section_is_undefined() {
        let context: Context = serde_json::from_str(
            r#"{"device": {"id": "d", "type": "laptop", "os": "linux"}, "network": {"threatLevel": 0.9}}"#,
        )
        .expect("partial context");

        assert_eq!(resolve(&context, "device.os"), FieldValue::Text("linux"));
        assert!(resolve(&context, "device.isManaged").is_undefined());
        assert!(resolve(&context, "device.trustScore").is_undefined());
        assert_eq!(resolve(&context, "network.threatLevel"), FieldValue::Number(0.9));
        assert!(resolve(&context, "network.ipAddress").is_undefined());
        assert!(resolve(&context, "network.isVPN").is_undefined());
    }

    #[test]
    fn test_unknown_paths_are_undefined() {
        let context = sample_context();
        assert!(resolve(&context, "user").is_undefined());
        assert!(resolve(&context, "user.role.length").is_undefined());
        assert!(resolve(&context, "user.nonexistent").is_undefined());
        assert!(resolve(&context, "").is_undefined());
        assert!(resolve(&context, "tenant.id").is_undefined());
    }

    #[test]
    fn test_known_fields_table() {
        assert!(is_known_field("device.isManaged"));
        assert!(is_known_field("network.isVPN"));
        assert!(!is_known_field("network.isVpn"));
        assert_eq!(known_fields().count(), 31);

        let mut names: Vec<&str> = known_fields().collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 31, "accessor table has duplicate paths");
    }
}
