//! The per-language information block of an alert.

use std::fmt;

use chrono::{DateTime, FixedOffset};

use crate::area::Area;
use crate::parameter::{EventCode, Parameter};
use crate::resource::Resource;
use crate::validation::{self, Rule, Validatable};
use crate::version::CapVersion;

pub const CATEGORY_GEO: &str = "Geo";
pub const CATEGORY_MET: &str = "Met";
pub const CATEGORY_SAFETY: &str = "Safety";
pub const CATEGORY_SECURITY: &str = "Security";
pub const CATEGORY_RESCUE: &str = "Rescue";
pub const CATEGORY_FIRE: &str = "Fire";
pub const CATEGORY_HEALTH: &str = "Health";
pub const CATEGORY_ENV: &str = "Env";
pub const CATEGORY_TRANSPORT: &str = "Transport";
pub const CATEGORY_INFRA: &str = "Infra";
pub const CATEGORY_CBRNE: &str = "CBRNE";
pub const CATEGORY_OTHER: &str = "Other";

/// Valid values for `categories`.
pub const VALID_CATEGORIES: [&str; 12] = [
    CATEGORY_GEO,
    CATEGORY_MET,
    CATEGORY_SAFETY,
    CATEGORY_SECURITY,
    CATEGORY_RESCUE,
    CATEGORY_FIRE,
    CATEGORY_HEALTH,
    CATEGORY_ENV,
    CATEGORY_TRANSPORT,
    CATEGORY_INFRA,
    CATEGORY_CBRNE,
    CATEGORY_OTHER,
];

pub const RESPONSE_TYPE_SHELTER: &str = "Shelter";
pub const RESPONSE_TYPE_EVACUATE: &str = "Evacuate";
pub const RESPONSE_TYPE_PREPARE: &str = "Prepare";
pub const RESPONSE_TYPE_EXECUTE: &str = "Execute";
pub const RESPONSE_TYPE_AVOID: &str = "Avoid";
pub const RESPONSE_TYPE_MONITOR: &str = "Monitor";
pub const RESPONSE_TYPE_ASSESS: &str = "Assess";
pub const RESPONSE_TYPE_ALL_CLEAR: &str = "AllClear";
pub const RESPONSE_TYPE_NONE: &str = "None";

/// Valid values for `response_types`.
pub const VALID_RESPONSE_TYPES: [&str; 9] = [
    RESPONSE_TYPE_SHELTER,
    RESPONSE_TYPE_EVACUATE,
    RESPONSE_TYPE_PREPARE,
    RESPONSE_TYPE_EXECUTE,
    RESPONSE_TYPE_AVOID,
    RESPONSE_TYPE_MONITOR,
    RESPONSE_TYPE_ASSESS,
    RESPONSE_TYPE_ALL_CLEAR,
    RESPONSE_TYPE_NONE,
];

pub const URGENCY_IMMEDIATE: &str = "Immediate";
pub const URGENCY_EXPECTED: &str = "Expected";
pub const URGENCY_FUTURE: &str = "Future";
pub const URGENCY_PAST: &str = "Past";
pub const URGENCY_UNKNOWN: &str = "Unknown";

/// Valid values for `urgency`.
pub const VALID_URGENCIES: [&str; 5] = [
    URGENCY_IMMEDIATE,
    URGENCY_EXPECTED,
    URGENCY_FUTURE,
    URGENCY_PAST,
    URGENCY_UNKNOWN,
];

pub const SEVERITY_EXTREME: &str = "Extreme";
pub const SEVERITY_SEVERE: &str = "Severe";
pub const SEVERITY_MODERATE: &str = "Moderate";
pub const SEVERITY_MINOR: &str = "Minor";
pub const SEVERITY_UNKNOWN: &str = "Unknown";

/// Valid values for `severity`.
pub const VALID_SEVERITIES: [&str; 5] = [
    SEVERITY_EXTREME,
    SEVERITY_SEVERE,
    SEVERITY_MODERATE,
    SEVERITY_MINOR,
    SEVERITY_UNKNOWN,
];

pub const CERTAINTY_VERY_LIKELY: &str = "Very Likely";
pub const CERTAINTY_LIKELY: &str = "Likely";
pub const CERTAINTY_POSSIBLE: &str = "Possible";
pub const CERTAINTY_UNLIKELY: &str = "Unlikely";
pub const CERTAINTY_UNKNOWN: &str = "Unknown";

/// Valid values for `certainty`.
pub const VALID_CERTAINTIES: [&str; 5] = [
    CERTAINTY_VERY_LIKELY,
    CERTAINTY_LIKELY,
    CERTAINTY_POSSIBLE,
    CERTAINTY_UNLIKELY,
    CERTAINTY_UNKNOWN,
];

/// Language used when a constructor fills none.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// One language/audience-specific information block within an alert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    /// RFC 3066 language code. [`Info::new`] fills [`DEFAULT_LANGUAGE`];
    /// decoding leaves it absent when the source carries none.
    pub language: Option<String>,
    /// Members of [`VALID_CATEGORIES`].
    pub categories: Vec<String>,
    pub event: Option<String>,
    /// Members of [`VALID_RESPONSE_TYPES`].
    pub response_types: Vec<String>,
    /// One of [`VALID_URGENCIES`].
    pub urgency: Option<String>,
    /// One of [`VALID_SEVERITIES`].
    pub severity: Option<String>,
    /// One of [`VALID_CERTAINTIES`].
    pub certainty: Option<String>,
    pub audience: Option<String>,
    pub event_codes: Vec<EventCode>,
    /// Effective start time of the information.
    pub effective: Option<DateTime<FixedOffset>>,
    /// Expected start of the event.
    pub onset: Option<DateTime<FixedOffset>>,
    /// Expiry time of the information.
    pub expires: Option<DateTime<FixedOffset>>,
    pub sender_name: Option<String>,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub web: Option<String>,
    pub contact: Option<String>,
    pub parameters: Vec<Parameter>,
    pub resources: Vec<Resource>,
    pub areas: Vec<Area>,
}

impl Info {
    /// A fresh block with the default language filled in.
    pub fn new() -> Self {
        Info {
            language: Some(DEFAULT_LANGUAGE.to_string()),
            ..Default::default()
        }
    }

    /// Runs `build` on a fresh event code, then appends it.
    pub fn add_event_code(&mut self, build: impl FnOnce(&mut EventCode)) -> &mut EventCode {
        let mut event_code = EventCode::default();
        build(&mut event_code);
        self.event_codes.push(event_code);
        self.event_codes.last_mut().unwrap()
    }

    /// Runs `build` on a fresh parameter, then appends it.
    pub fn add_parameter(&mut self, build: impl FnOnce(&mut Parameter)) -> &mut Parameter {
        let mut parameter = Parameter::default();
        build(&mut parameter);
        self.parameters.push(parameter);
        self.parameters.last_mut().unwrap()
    }

    /// Runs `build` on a fresh resource, then appends it.
    pub fn add_resource(&mut self, build: impl FnOnce(&mut Resource)) -> &mut Resource {
        let mut resource = Resource::default();
        build(&mut resource);
        self.resources.push(resource);
        self.resources.last_mut().unwrap()
    }

    /// Runs `build` on a fresh area, then appends it.
    pub fn add_area(&mut self, build: impl FnOnce(&mut Area)) -> &mut Area {
        let mut area = Area::default();
        build(&mut area);
        self.areas.push(area);
        self.areas.last_mut().unwrap()
    }
}

impl fmt::Display for Info {
    /// `event(urgency/severity/certainty)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}/{}/{})",
            self.event.as_deref().unwrap_or_default(),
            self.urgency.as_deref().unwrap_or_default(),
            self.severity.as_deref().unwrap_or_default(),
            self.certainty.as_deref().unwrap_or_default(),
        )
    }
}

impl Validatable for Info {
    fn validation_rules(_version: CapVersion) -> Vec<Rule<Self>> {
        vec![
            Rule::Presence {
                attribute: "event",
                present: |i: &Info| validation::non_blank(&i.event),
            },
            Rule::Presence {
                attribute: "urgency",
                present: |i: &Info| validation::non_blank(&i.urgency),
            },
            Rule::Presence {
                attribute: "severity",
                present: |i: &Info| validation::non_blank(&i.severity),
            },
            Rule::Presence {
                attribute: "certainty",
                present: |i: &Info| validation::non_blank(&i.certainty),
            },
            Rule::Inclusion {
                attribute: "urgency",
                value: |i: &Info| i.urgency.as_deref(),
                allowed: &VALID_URGENCIES,
            },
            Rule::Inclusion {
                attribute: "severity",
                value: |i: &Info| i.severity.as_deref(),
                allowed: &VALID_SEVERITIES,
            },
            Rule::Inclusion {
                attribute: "certainty",
                value: |i: &Info| i.certainty.as_deref(),
                allowed: &VALID_CERTAINTIES,
            },
            Rule::InclusionOfMembers {
                attribute: "categories",
                values: |i: &Info| &i.categories,
                allowed: &VALID_CATEGORIES,
            },
            Rule::InclusionOfMembers {
                attribute: "response_types",
                values: |i: &Info| &i.response_types,
                allowed: &VALID_RESPONSE_TYPES,
            },
            Rule::Collection {
                validate: |i: &Info, version, prefix, out| {
                    for (n, event_code) in i.event_codes.iter().enumerate() {
                        validation::validate_into(
                            event_code,
                            version,
                            &format!("{prefix}event_codes[{n}]."),
                            out,
                        );
                    }
                },
            },
            Rule::Collection {
                validate: |i: &Info, version, prefix, out| {
                    for (n, parameter) in i.parameters.iter().enumerate() {
                        validation::validate_into(
                            parameter,
                            version,
                            &format!("{prefix}parameters[{n}]."),
                            out,
                        );
                    }
                },
            },
            Rule::Collection {
                validate: |i: &Info, version, prefix, out| {
                    for (n, resource) in i.resources.iter().enumerate() {
                        validation::validate_into(
                            resource,
                            version,
                            &format!("{prefix}resources[{n}]."),
                            out,
                        );
                    }
                },
            },
            Rule::Collection {
                validate: |i: &Info, version, prefix, out| {
                    for (n, area) in i.areas.iter().enumerate() {
                        validation::validate_into(
                            area,
                            version,
                            &format!("{prefix}areas[{n}]."),
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
    use crate::validation::validate;

    fn minimal_info() -> Info {
        let mut info = Info::new();
        info.event = Some("Flash Flood Warning".to_string());
        info.urgency = Some(URGENCY_IMMEDIATE.to_string());
        info.severity = Some(SEVERITY_SEVERE.to_string());
        info.certainty = Some(CERTAINTY_LIKELY.to_string());
        info
    }

    #[test]
    fn test_minimal_info_is_valid() {
        assert!(validate(&minimal_info(), CapVersion::V1_2).is_valid());
    }

    #[test]
    fn test_new_fills_default_language() {
        assert_eq!(Info::new().language.as_deref(), Some(DEFAULT_LANGUAGE));
        assert_eq!(Info::default().language, None);
    }

    #[test]
    fn test_unknown_severity_is_reported() {
        let mut info = minimal_info();
        info.severity = Some("Catastrophic".to_string());
        let result = validate(&info, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "severity");
    }

    #[test]
    fn test_known_severity_passes() {
        let mut info = minimal_info();
        info.severity = Some(SEVERITY_EXTREME.to_string());
        let result = validate(&info, CapVersion::V1_2);
        assert!(result.violations.iter().all(|v| v.path != "severity"));
    }

    #[test]
    fn test_unknown_category_is_reported() {
        let mut info = minimal_info();
        info.categories.push("Weather".to_string());
        let result = validate(&info, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "categories");
    }

    #[test]
    fn test_missing_required_fields_all_reported() {
        let result = validate(&Info::default(), CapVersion::V1_2);
        let paths: Vec<&str> = result.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, ["event", "urgency", "severity", "certainty"]);
    }

    #[test]
    fn test_display_form() {
        assert_eq!(
            minimal_info().to_string(),
            "Flash Flood Warning(Immediate/Severe/Likely)"
        );
    }
}
