//! Name/value pair entities.

use crate::validation::{self, Rule, Validatable};
use crate::version::CapVersion;

/// A named value attached to an Info block or Area.
///
/// Event codes and geocodes share this shape; only their markup element
/// differs, which is a codec concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter {
    pub name: Option<String>,
    pub value: Option<String>,
}

/// System-specific event typing code.
pub type EventCode = Parameter;

/// Geographic code naming an area.
pub type Geocode = Parameter;

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Parameter {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }
}

impl Validatable for Parameter {
    fn validation_rules(_version: CapVersion) -> Vec<Rule<Self>> {
        vec![
            Rule::Presence {
                attribute: "name",
                present: |p: &Parameter| validation::non_blank(&p.name),
            },
            Rule::Presence {
                attribute: "value",
                present: |p: &Parameter| validation::non_blank(&p.value),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn test_requires_name_and_value() {
        let result = validate(&Parameter::default(), CapVersion::V1_2);
        let paths: Vec<&str> = result.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, ["name", "value"]);
    }

    #[test]
    fn test_complete_pair_is_valid() {
        let pair = Parameter::new("SAME", "CEM");
        assert!(validate(&pair, CapVersion::V1_0).is_valid());
    }
}
