//! # Capwire Codec
//!
//! Multi-format, multi-version codecs for the alert entity tree defined in
//! `capwire-core`.
//!
//! Two codec families cover four external representations:
//!
//! - **Markup** ([`parser`], [`serializer`]): schema-exact,
//!   namespace-qualified XML in any of the three supported revisions.
//!   Element vocabulary and structural variants are driven entirely by the
//!   version descriptor ([`schema`]); exact element order, duplicate pair
//!   elements and the quoting rules of list-valued fields are preserved.
//! - **Mapping** ([`map`]): one canonical snake_case key/value
//!   representation rendered as a plain mapping, as JSON, or as YAML.
//!   Simpler and version-independent, but deliberately lossy for duplicate
//!   parameter/geocode names.
//!
//! Codecs never validate: they faithfully write and read whatever the
//! entities hold. Semantic checking is the separate, opt-in validation
//! engine in `capwire-core`.
//!
//! # Example
//!
//! ```
//! use capwire_codec::{parse_alert, serialize_alert};
//! use capwire_core::{Alert, CapVersion};
//!
//! let mut alert = Alert::new();
//! alert.sender = Some("alerts@example.org".into());
//! alert.status = Some("Actual".into());
//!
//! let xml = serialize_alert(&alert, CapVersion::V1_2).unwrap();
//! let (version, decoded) = parse_alert(&xml).unwrap();
//! assert_eq!(version, CapVersion::V1_2);
//! assert_eq!(decoded, alert);
//! ```

pub mod caplist;
pub mod error;
pub mod map;
pub mod parser;
pub mod schema;
pub mod serializer;

pub use error::{DecodeError, EncodeError};
pub use map::{alert_from_map, alert_to_map, from_json, from_yaml, to_json, to_yaml};
pub use parser::{parse_alert, parse_alert_with_version};
pub use serializer::serialize_alert;
