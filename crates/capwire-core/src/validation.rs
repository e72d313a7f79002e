//! Declarative validation over the alert entity tree.
//!
//! Each entity type composes a list of [`Rule`]s via the [`Validatable`]
//! trait; the engine walks an entity (and, through collection rules, its
//! children) and collects every failure into a [`ValidationResult`].
//! Validation never mutates the entity and never returns early: all
//! violations surface together so callers can batch-report them.

use lazy_static::lazy_static;
use regex::Regex;

use crate::version::CapVersion;

lazy_static! {
    /// Characters permitted in identifier-like fields: anything except
    /// whitespace, `&` and `<`.
    pub static ref ALLOWED_CHARACTERS: Regex = Regex::new(r"^[^\s&<]+$").unwrap();
}

/// One reported validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Attribute path in snake_case, with collection indices,
    /// e.g. `infos[0].areas[0].area_desc`.
    pub path: String,
    /// Human-readable description of the failed rule.
    pub message: String,
}

/// The outcome of validating an entity tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Violations in rule-declaration order, parents before children.
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    /// True when no rule failed anywhere in the tree.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A single declarative rule attached to an entity type.
///
/// Accessors are plain function pointers so rule lists stay cheap to build
/// and carry no per-instance state.
pub enum Rule<T> {
    /// The attribute must be present and non-empty.
    Presence {
        attribute: &'static str,
        present: fn(&T) -> bool,
    },
    /// The attribute, when present, must be one of a fixed set of values.
    Inclusion {
        attribute: &'static str,
        value: fn(&T) -> Option<&str>,
        allowed: &'static [&'static str],
    },
    /// Every member of a collection attribute must be one of a fixed set of
    /// values. An empty collection passes.
    InclusionOfMembers {
        attribute: &'static str,
        values: fn(&T) -> &[String],
        allowed: &'static [&'static str],
    },
    /// The attribute, when present, must match a character-class pattern.
    Format {
        attribute: &'static str,
        value: fn(&T) -> Option<&str>,
        pattern: &'static Regex,
    },
    /// The attribute may only be set while a condition on another attribute
    /// holds.
    Dependency {
        attribute: &'static str,
        present: fn(&T) -> bool,
        condition: fn(&T) -> bool,
        message: &'static str,
    },
    /// The attribute must be set whenever a condition on another attribute
    /// holds. An empty collection counts as absent.
    RequiredWhen {
        attribute: &'static str,
        present: fn(&T) -> bool,
        condition: fn(&T) -> bool,
        message: &'static str,
    },
    /// A free-form check over the whole entity, reported against one
    /// attribute.
    Predicate {
        attribute: &'static str,
        check: fn(&T) -> bool,
        message: &'static str,
    },
    /// Recursively validates the members of a child collection. The callback
    /// is expected to call [`validate_into`] with an index-suffixed prefix
    /// for each member.
    Collection {
        validate: fn(&T, CapVersion, &str, &mut Vec<Violation>),
    },
}

/// An entity type that declares its validation rules.
///
/// Rule lists are composed per type (not per instance) and may vary only by
/// schema version.
pub trait Validatable: Sized {
    fn validation_rules(version: CapVersion) -> Vec<Rule<Self>>;
}

/// Validates an entity and everything it owns.
pub fn validate<T: Validatable>(entity: &T, version: CapVersion) -> ValidationResult {
    let mut violations = Vec::new();
    validate_into(entity, version, "", &mut violations);
    ValidationResult { violations }
}

/// Applies an entity's rules, prefixing every reported path.
///
/// Collection rules use this to descend into child entities.
pub fn validate_into<T: Validatable>(
    entity: &T,
    version: CapVersion,
    prefix: &str,
    out: &mut Vec<Violation>,
) {
    for rule in T::validation_rules(version) {
        rule.apply(entity, version, prefix, out);
    }
}

/// True when an optional string holds non-whitespace content.
pub(crate) fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl<T> Rule<T> {
    fn apply(&self, entity: &T, version: CapVersion, prefix: &str, out: &mut Vec<Violation>) {
        match self {
            Rule::Presence { attribute, present } => {
                if !present(entity) {
                    report(out, prefix, attribute, "is not present or is empty".to_string());
                }
            }
            Rule::Inclusion {
                attribute,
                value,
                allowed,
            } => {
                if let Some(v) = value(entity) {
                    if !allowed.contains(&v) {
                        report(
                            out,
                            prefix,
                            attribute,
                            format!(
                                "can only be assigned the following values: {}",
                                allowed.join(", ")
                            ),
                        );
                    }
                }
            }
            Rule::InclusionOfMembers {
                attribute,
                values,
                allowed,
            } => {
                if values(entity).iter().any(|v| !allowed.contains(&v.as_str())) {
                    report(
                        out,
                        prefix,
                        attribute,
                        format!(
                            "can only contain the following values: {}",
                            allowed.join(", ")
                        ),
                    );
                }
            }
            Rule::Format {
                attribute,
                value,
                pattern,
            } => {
                if let Some(v) = value(entity) {
                    if !pattern.is_match(v) {
                        report(
                            out,
                            prefix,
                            attribute,
                            "contains characters that are not allowed".to_string(),
                        );
                    }
                }
            }
            Rule::Dependency {
                attribute,
                present,
                condition,
                message,
            } => {
                if present(entity) && !condition(entity) {
                    report(out, prefix, attribute, (*message).to_string());
                }
            }
            Rule::RequiredWhen {
                attribute,
                present,
                condition,
                message,
            } => {
                if condition(entity) && !present(entity) {
                    report(out, prefix, attribute, (*message).to_string());
                }
            }
            Rule::Predicate {
                attribute,
                check,
                message,
            } => {
                if !check(entity) {
                    report(out, prefix, attribute, (*message).to_string());
                }
            }
            Rule::Collection { validate } => {
                validate(entity, version, prefix, out);
            }
        }
    }
}

fn report(out: &mut Vec<Violation>, prefix: &str, attribute: &str, message: String) {
    out.push(Violation {
        path: format!("{prefix}{attribute}"),
        message,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget {
        label: Option<String>,
        kind: Option<String>,
        tags: Vec<String>,
        parts: Vec<Widget>,
    }

    impl Widget {
        fn named(label: &str) -> Self {
            Widget {
                label: Some(label.to_string()),
                kind: None,
                tags: Vec::new(),
                parts: Vec::new(),
            }
        }
    }

    const KINDS: [&str; 2] = ["simple", "fancy"];

    impl Validatable for Widget {
        fn validation_rules(_version: CapVersion) -> Vec<Rule<Self>> {
            vec![
                Rule::Presence {
                    attribute: "label",
                    present: |w: &Widget| non_blank(&w.label),
                },
                Rule::Inclusion {
                    attribute: "kind",
                    value: |w: &Widget| w.kind.as_deref(),
                    allowed: &KINDS,
                },
                Rule::InclusionOfMembers {
                    attribute: "tags",
                    values: |w: &Widget| &w.tags,
                    allowed: &KINDS,
                },
                Rule::Format {
                    attribute: "label",
                    value: |w: &Widget| w.label.as_deref(),
                    pattern: &ALLOWED_CHARACTERS,
                },
                Rule::Collection {
                    validate: |w: &Widget, version, prefix, out| {
                        for (i, part) in w.parts.iter().enumerate() {
                            validate_into(part, version, &format!("{prefix}parts[{i}]."), out);
                        }
                    },
                },
            ]
        }
    }

    #[test]
    fn test_presence_rule() {
        let mut widget = Widget::named("w1");
        widget.label = None;
        let result = validate(&widget, CapVersion::V1_2);
        assert!(!result.is_valid());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "label");
    }

    #[test]
    fn test_inclusion_allows_absent_value() {
        let widget = Widget::named("w1");
        assert!(validate(&widget, CapVersion::V1_2).is_valid());
    }

    #[test]
    fn test_inclusion_rejects_unknown_value() {
        let mut widget = Widget::named("w1");
        widget.kind = Some("bizarre".to_string());
        let result = validate(&widget, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "kind");
    }

    #[test]
    fn test_member_inclusion() {
        let mut widget = Widget::named("w1");
        widget.tags = vec!["simple".to_string(), "unknown".to_string()];
        let result = validate(&widget, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "tags");
    }

    #[test]
    fn test_format_rule() {
        let widget = Widget::named("not allowed");
        let result = validate(&widget, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "label");
    }

    #[test]
    fn test_collection_rule_prefixes_paths() {
        let mut widget = Widget::named("w1");
        let mut part = Widget::named("inner");
        part.label = None;
        widget.parts.push(part);
        let result = validate(&widget, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "parts[0].label");
    }
}
