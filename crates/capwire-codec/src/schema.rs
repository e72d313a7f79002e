//! The schema version descriptor: one static row per supported revision.
//!
//! This table is the only place where the codecs differ by version. Entity
//! types know nothing about namespaces or element availability; both the
//! markup codec and the mapping codec look everything up here.

use capwire_core::CapVersion;

/// How a name/value pair entity is written in markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairEncoding {
    /// A single text element: `<parameter>name=value</parameter>`.
    NameEqualsValue,
    /// Two child elements: `<geocode><valueName>…</valueName><value>…</value></geocode>`.
    ValueNameElements,
}

/// Element vocabulary and structural variants of one schema revision.
#[derive(Debug, Clone, Copy)]
pub struct VersionSpec {
    pub version: CapVersion,
    /// Namespace URI declared once on the root element.
    pub xmlns: &'static str,
    /// Whether `eventCode` exists as an element distinct from `parameter`.
    pub has_event_code: bool,
    /// Whether `responseType` exists.
    pub has_response_type: bool,
    /// Whether `derefUri` exists on resources.
    pub has_deref_uri: bool,
    pub parameter_encoding: PairEncoding,
    pub event_code_encoding: PairEncoding,
    pub geocode_encoding: PairEncoding,
}

static V1_0: VersionSpec = VersionSpec {
    version: CapVersion::V1_0,
    xmlns: CapVersion::V1_0.xmlns(),
    has_event_code: false,
    has_response_type: false,
    has_deref_uri: false,
    parameter_encoding: PairEncoding::NameEqualsValue,
    event_code_encoding: PairEncoding::NameEqualsValue,
    geocode_encoding: PairEncoding::NameEqualsValue,
};

static V1_1: VersionSpec = VersionSpec {
    version: CapVersion::V1_1,
    xmlns: CapVersion::V1_1.xmlns(),
    has_event_code: true,
    has_response_type: true,
    has_deref_uri: true,
    parameter_encoding: PairEncoding::NameEqualsValue,
    event_code_encoding: PairEncoding::NameEqualsValue,
    geocode_encoding: PairEncoding::ValueNameElements,
};

static V1_2: VersionSpec = VersionSpec {
    version: CapVersion::V1_2,
    xmlns: CapVersion::V1_2.xmlns(),
    has_event_code: true,
    has_response_type: true,
    has_deref_uri: true,
    parameter_encoding: PairEncoding::NameEqualsValue,
    event_code_encoding: PairEncoding::NameEqualsValue,
    geocode_encoding: PairEncoding::ValueNameElements,
};

/// The descriptor row for a version.
pub fn for_version(version: CapVersion) -> &'static VersionSpec {
    match version {
        CapVersion::V1_0 => &V1_0,
        CapVersion::V1_1 => &V1_1,
        CapVersion::V1_2 => &V1_2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_match_their_version() {
        for version in CapVersion::ALL {
            let spec = for_version(version);
            assert_eq!(spec.version, version);
            assert_eq!(spec.xmlns, version.xmlns());
        }
    }

    #[test]
    fn test_1_0_has_no_late_additions() {
        let spec = for_version(CapVersion::V1_0);
        assert!(!spec.has_event_code);
        assert!(!spec.has_response_type);
        assert!(!spec.has_deref_uri);
        assert_eq!(spec.geocode_encoding, PairEncoding::NameEqualsValue);
    }
}
