//! The root alert entity.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::datetime::format_cap_datetime;
use crate::info::Info;
use crate::validation::{self, Rule, Validatable, ALLOWED_CHARACTERS};
use crate::version::CapVersion;

pub const STATUS_ACTUAL: &str = "Actual";
pub const STATUS_EXERCISE: &str = "Exercise";
pub const STATUS_SYSTEM: &str = "System";
pub const STATUS_TEST: &str = "Test";

/// Valid values for `status`.
pub const VALID_STATUSES: [&str; 4] = [STATUS_ACTUAL, STATUS_EXERCISE, STATUS_SYSTEM, STATUS_TEST];

pub const MSG_TYPE_ALERT: &str = "Alert";
pub const MSG_TYPE_UPDATE: &str = "Update";
pub const MSG_TYPE_CANCEL: &str = "Cancel";
pub const MSG_TYPE_ACK: &str = "Ack";
pub const MSG_TYPE_ERROR: &str = "Error";

/// Valid values for `msg_type`.
pub const VALID_MSG_TYPES: [&str; 5] = [
    MSG_TYPE_ALERT,
    MSG_TYPE_UPDATE,
    MSG_TYPE_CANCEL,
    MSG_TYPE_ACK,
    MSG_TYPE_ERROR,
];

pub const SCOPE_PUBLIC: &str = "Public";
pub const SCOPE_RESTRICTED: &str = "Restricted";
pub const SCOPE_PRIVATE: &str = "Private";

/// Valid values for `scope`.
pub const VALID_SCOPES: [&str; 3] = [SCOPE_PUBLIC, SCOPE_RESTRICTED, SCOPE_PRIVATE];

/// Generates a fresh message identifier.
///
/// Stateless and safe to call from any number of threads; no process-wide
/// counter is involved.
pub fn generate_identifier() -> String {
    Uuid::new_v4().to_string()
}

/// One alerting message: administrative envelope plus any number of
/// [`Info`] blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alert {
    /// Unique message identifier. [`Alert::new`] fills a generated one;
    /// decoding leaves it absent when the source carries none.
    pub identifier: Option<String>,
    pub sender: Option<String>,
    pub sent: Option<DateTime<FixedOffset>>,
    /// One of [`VALID_STATUSES`].
    pub status: Option<String>,
    /// One of [`VALID_MSG_TYPES`].
    pub msg_type: Option<String>,
    pub password: Option<String>,
    pub source: Option<String>,
    /// One of [`VALID_SCOPES`].
    pub scope: Option<String>,
    /// Rule describing the restriction. Only meaningful when `scope` is
    /// [`SCOPE_RESTRICTED`].
    pub restriction: Option<String>,
    /// Intended recipients. Required non-empty when `scope` is
    /// [`SCOPE_PRIVATE`].
    pub addresses: Vec<String>,
    /// Special handling codes.
    pub codes: Vec<String>,
    pub note: Option<String>,
    /// References to earlier messages, each of the form
    /// `sender,identifier,sent`.
    pub references: Vec<String>,
    /// Names of incidents this message collates.
    pub incidents: Vec<String>,
    pub infos: Vec<Info>,
}

impl Alert {
    /// A fresh alert with a generated identifier.
    pub fn new() -> Self {
        Alert {
            identifier: Some(generate_identifier()),
            ..Default::default()
        }
    }

    /// Runs `build` on a fresh info block, then appends it.
    pub fn add_info(&mut self, build: impl FnOnce(&mut Info)) -> &mut Info {
        let mut info = Info::new();
        build(&mut info);
        self.infos.push(info);
        self.infos.last_mut().unwrap()
    }

    /// The `sender,identifier,sent` form used to reference this message
    /// from another one.
    pub fn reference(&self) -> String {
        format!(
            "{},{},{}",
            self.sender.as_deref().unwrap_or_default(),
            self.identifier.as_deref().unwrap_or_default(),
            self.sent.as_ref().map(format_cap_datetime).unwrap_or_default(),
        )
    }
}

impl fmt::Display for Alert {
    /// `sender/identifier/sent`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.sender.as_deref().unwrap_or_default(),
            self.identifier.as_deref().unwrap_or_default(),
            self.sent.as_ref().map(format_cap_datetime).unwrap_or_default(),
        )
    }
}

impl Validatable for Alert {
    fn validation_rules(_version: CapVersion) -> Vec<Rule<Self>> {
        vec![
            Rule::Presence {
                attribute: "identifier",
                present: |a: &Alert| validation::non_blank(&a.identifier),
            },
            Rule::Presence {
                attribute: "sender",
                present: |a: &Alert| validation::non_blank(&a.sender),
            },
            Rule::Presence {
                attribute: "sent",
                present: |a: &Alert| a.sent.is_some(),
            },
            Rule::Presence {
                attribute: "status",
                present: |a: &Alert| validation::non_blank(&a.status),
            },
            Rule::Presence {
                attribute: "msg_type",
                present: |a: &Alert| validation::non_blank(&a.msg_type),
            },
            Rule::Presence {
                attribute: "scope",
                present: |a: &Alert| validation::non_blank(&a.scope),
            },
            Rule::Inclusion {
                attribute: "status",
                value: |a: &Alert| a.status.as_deref(),
                allowed: &VALID_STATUSES,
            },
            Rule::Inclusion {
                attribute: "msg_type",
                value: |a: &Alert| a.msg_type.as_deref(),
                allowed: &VALID_MSG_TYPES,
            },
            Rule::Inclusion {
                attribute: "scope",
                value: |a: &Alert| a.scope.as_deref(),
                allowed: &VALID_SCOPES,
            },
            Rule::Format {
                attribute: "identifier",
                value: |a: &Alert| a.identifier.as_deref(),
                pattern: &ALLOWED_CHARACTERS,
            },
            Rule::Format {
                attribute: "sender",
                value: |a: &Alert| a.sender.as_deref(),
                pattern: &ALLOWED_CHARACTERS,
            },
            Rule::Dependency {
                attribute: "addresses",
                present: |a: &Alert| !a.addresses.is_empty(),
                condition: |a: &Alert| a.scope.as_deref() == Some(SCOPE_PRIVATE),
                message: "is only allowed when scope is 'Private'",
            },
            Rule::RequiredWhen {
                attribute: "addresses",
                present: |a: &Alert| !a.addresses.is_empty(),
                condition: |a: &Alert| a.scope.as_deref() == Some(SCOPE_PRIVATE),
                message: "must not be empty when scope is 'Private'",
            },
            Rule::Dependency {
                attribute: "restriction",
                present: |a: &Alert| validation::non_blank(&a.restriction),
                condition: |a: &Alert| a.scope.as_deref() == Some(SCOPE_RESTRICTED),
                message: "is only allowed when scope is 'Restricted'",
            },
            Rule::Collection {
                validate: |a: &Alert, version, prefix, out| {
                    for (i, info) in a.infos.iter().enumerate() {
                        validation::validate_into(
                            info,
                            version,
                            &format!("{prefix}infos[{i}]."),
                            out,
                        );
                    }
                },
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::parse_cap_datetime;
    use crate::info;
    use crate::validation::validate;

    fn valid_alert() -> Alert {
        let mut alert = Alert::new();
        alert.sender = Some("alerts@example.org".to_string());
        alert.sent = Some(parse_cap_datetime("2024-01-15T10:30:00+02:00").unwrap());
        alert.status = Some(STATUS_ACTUAL.to_string());
        alert.msg_type = Some(MSG_TYPE_ALERT.to_string());
        alert.scope = Some(SCOPE_PUBLIC.to_string());
        alert
    }

    #[test]
    fn test_valid_alert() {
        assert!(validate(&valid_alert(), CapVersion::V1_2).is_valid());
    }

    #[test]
    fn test_new_generates_identifier() {
        let a = Alert::new();
        let b = Alert::new();
        assert!(a.identifier.is_some());
        assert_ne!(a.identifier, b.identifier);
        assert_eq!(Alert::default().identifier, None);
    }

    #[test]
    fn test_missing_identifier_reported_once() {
        let mut alert = valid_alert();
        alert.identifier = None;
        let result = validate(&alert, CapVersion::V1_2);
        assert!(!result.is_valid());
        let on_identifier: Vec<_> = result
            .violations
            .iter()
            .filter(|v| v.path == "identifier")
            .collect();
        assert_eq!(on_identifier.len(), 1);
        assert_eq!(result.violations.len(), 1);
    }

    #[test]
    fn test_identifier_character_pattern() {
        let mut alert = valid_alert();
        alert.identifier = Some("has space".to_string());
        let result = validate(&alert, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "identifier");
    }

    #[test]
    fn test_unknown_status_reported() {
        let mut alert = valid_alert();
        alert.status = Some("Draft".to_string());
        let result = validate(&alert, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "status");
    }

    #[test]
    fn test_addresses_require_private_scope() {
        let mut alert = valid_alert();
        alert.addresses.push("jane@example.org".to_string());
        let result = validate(&alert, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "addresses");
    }

    #[test]
    fn test_private_scope_requires_addresses() {
        let mut alert = valid_alert();
        alert.scope = Some(SCOPE_PRIVATE.to_string());
        let result = validate(&alert, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "addresses");

        alert.addresses.push("jane@example.org".to_string());
        assert!(validate(&alert, CapVersion::V1_2).is_valid());
    }

    #[test]
    fn test_restriction_requires_restricted_scope() {
        let mut alert = valid_alert();
        alert.restriction = Some("Law enforcement only".to_string());
        let result = validate(&alert, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "restriction");

        alert.scope = Some(SCOPE_RESTRICTED.to_string());
        assert!(validate(&alert, CapVersion::V1_2).is_valid());
    }

    #[test]
    fn test_nested_violation_path() {
        let mut alert = valid_alert();
        alert.add_info(|info| {
            info.event = Some("Flood".to_string());
            info.urgency = Some(info::URGENCY_IMMEDIATE.to_string());
            info.severity = Some(info::SEVERITY_SEVERE.to_string());
            info.certainty = Some(info::CERTAINTY_LIKELY.to_string());
            info.add_area(|_area| {});
        });
        let result = validate(&alert, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "infos[0].areas[0].area_desc");
    }

    #[test]
    fn test_reference_form() {
        let alert = valid_alert();
        let identifier = alert.identifier.clone().unwrap();
        assert_eq!(
            alert.reference(),
            format!("alerts@example.org,{identifier},2024-01-15T10:30:00+02:00")
        );
    }
}
