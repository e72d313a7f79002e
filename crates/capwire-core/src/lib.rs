//! # Capwire Core
//!
//! Data model and validation for multi-version emergency alerting messages.
//!
//! This crate provides the building blocks shared by every codec:
//!
//! - **Entities**: [`Alert`], [`Info`], [`Area`], [`Resource`] and the
//!   smaller value types they own. Plain owned containers with structural
//!   equality; parents own children, nothing points back up.
//! - **Validation**: a declarative rule engine ([`validation`]) that walks
//!   an entity tree and reports every rule failure as data rather than
//!   stopping at the first problem.
//! - **Versioning**: the [`CapVersion`] enum naming the three supported
//!   schema revisions. Entities carry no version-conditional logic; codecs
//!   and validation receive the version explicitly.
//! - **Timestamps**: the fixed ISO-8601-with-numeric-offset text profile
//!   ([`datetime`]) used identically by every external representation.
//!
//! Validation is always opt-in: constructing or serializing an invalid
//! alert is permitted, and callers decide when to check.
//!
//! ## Example
//!
//! ```
//! use capwire_core::{validate, Alert, CapVersion};
//!
//! let mut alert = Alert::new();
//! alert.sender = Some("alerts@example.org".into());
//! alert.status = Some(capwire_core::alert::STATUS_ACTUAL.into());
//! alert.msg_type = Some(capwire_core::alert::MSG_TYPE_ALERT.into());
//! alert.scope = Some(capwire_core::alert::SCOPE_PUBLIC.into());
//!
//! // `sent` is still missing:
//! let result = validate(&alert, CapVersion::V1_2);
//! assert!(!result.is_valid());
//! assert_eq!(result.violations[0].path, "sent");
//! ```

pub mod alert;
pub mod area;
pub mod datetime;
pub mod info;
pub mod parameter;
pub mod resource;
pub mod validation;
pub mod version;

pub use alert::{generate_identifier, Alert};
pub use area::{Area, Circle, Point, Polygon};
pub use info::Info;
pub use parameter::{EventCode, Geocode, Parameter};
pub use resource::Resource;
pub use validation::{validate, Rule, Validatable, ValidationResult, Violation};
pub use version::CapVersion;
