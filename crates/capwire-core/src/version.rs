//! Supported schema revisions.

use std::fmt;

/// The three backward-incompatible revisions of the alerting schema.
///
/// A `CapVersion` is carried alongside an [`crate::Alert`] rather than inside
/// it: entities themselves hold no version-conditional state, and codecs
/// receive the version explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapVersion {
    /// The original 1.0 revision.
    V1_0,
    /// The 1.1 revision.
    V1_1,
    /// The 1.2 revision.
    V1_2,
}

impl CapVersion {
    /// All supported versions, oldest first.
    pub const ALL: [CapVersion; 3] = [CapVersion::V1_0, CapVersion::V1_1, CapVersion::V1_2];

    /// The dotted version string, e.g. `"1.2"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            CapVersion::V1_0 => "1.0",
            CapVersion::V1_1 => "1.1",
            CapVersion::V1_2 => "1.2",
        }
    }

    /// The XML namespace URI declared on the root element of this revision.
    pub const fn xmlns(self) -> &'static str {
        match self {
            CapVersion::V1_0 => "http://www.incident.com/cap/1.0",
            CapVersion::V1_1 => "urn:oasis:names:tc:emergency:cap:1.1",
            CapVersion::V1_2 => "urn:oasis:names:tc:emergency:cap:1.2",
        }
    }

    /// Looks up the version declared by a namespace URI.
    pub fn from_xmlns(ns: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.xmlns() == ns)
    }

    /// Looks up the version named by a dotted version string.
    pub fn from_version_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

impl fmt::Display for CapVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
