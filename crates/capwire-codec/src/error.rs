//! Decode and encode error types shared by the markup and mapping codecs.
//!
//! Structural problems in an external representation surface here as typed
//! errors and abort decoding; semantic rule failures never do — those are
//! the validation engine's business and are returned as data.

use capwire_core::CapVersion;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("text escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("root element is not in a recognized alert namespace: {0:?}")]
    UnknownNamespace(String),

    #[error("unknown schema version: {0:?}")]
    UnknownVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid timestamp in {field}: {value:?}")]
    InvalidTimestamp { field: String, value: String },

    #[error("invalid number in {field}: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(String),
}

impl DecodeError {
    pub(crate) fn invalid_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        DecodeError::InvalidNumber {
            field: field.into(),
            value: value.into(),
        }
    }

    pub(crate) fn invalid_timestamp(field: impl Into<String>, value: impl Into<String>) -> Self {
        DecodeError::InvalidTimestamp {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    /// The field is set on the entity but the target schema revision has no
    /// element for it. Raised instead of dropping data silently.
    #[error("{path} cannot be represented in schema version {version}")]
    FieldNotRepresentable { path: String, version: CapVersion },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
