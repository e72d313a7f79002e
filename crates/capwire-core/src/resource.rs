//! Supplemental resource attachments.

use std::fmt;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};

use crate::validation::{self, Rule, Validatable};
use crate::version::CapVersion;

/// A reference to supplemental content (image, audio, document) attached to
/// an Info block.
///
/// One entity shape serves every schema revision; which fields the markup
/// codec reads and writes is decided by the version descriptor, not here.
/// Fetching the content behind `uri` is the caller's concern — the helpers
/// below only operate on bytes the caller already holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub resource_desc: Option<String>,
    /// MIME type as described in RFC 2046.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size: Option<u64>,
    pub uri: Option<String>,
    /// Content of `uri`, base64 encoded.
    pub deref_uri: Option<String>,
    /// SHA-1 hash of the resource content, lowercase hex.
    pub digest: Option<String>,
}

impl Resource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the size and digest of content the caller fetched from `uri`.
    pub fn update_digest(&mut self, content: &[u8]) {
        self.digest = Some(hex_digest(content));
        self.size = Some(content.len() as u64);
    }

    /// Stores `content` base64 encoded in `deref_uri`, with the digest and
    /// size computed over the encoded text.
    pub fn embed_content(&mut self, content: &[u8]) {
        let encoded = BASE64_STANDARD.encode(content);
        self.digest = Some(hex_digest(encoded.as_bytes()));
        self.size = Some(encoded.len() as u64);
        self.deref_uri = Some(encoded);
    }

    /// Decodes the embedded content, if any.
    pub fn decoded_content(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.deref_uri.as_deref().map(|d| BASE64_STANDARD.decode(d))
    }

    /// The size in kilobytes, if a size is recorded.
    pub fn size_in_kb(&self) -> Option<f64> {
        self.size.map(|s| s as f64 / 1024.0)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_desc.as_deref().unwrap_or_default())
    }
}

impl Validatable for Resource {
    fn validation_rules(version: CapVersion) -> Vec<Rule<Self>> {
        let mut rules = vec![Rule::Presence {
            attribute: "resource_desc",
            present: |r: &Resource| validation::non_blank(&r.resource_desc),
        }];
        // The 1.2 revision promoted mimeType from optional to required.
        if version == CapVersion::V1_2 {
            rules.push(Rule::Presence {
                attribute: "mime_type",
                present: |r: &Resource| validation::non_blank(&r.mime_type),
            });
        }
        rules
    }
}

fn hex_digest(data: &[u8]) -> String {
    let digest = Sha1::digest(data);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn test_mime_type_required_only_in_1_2() {
        let mut resource = Resource::new();
        resource.resource_desc = Some("Site map".to_string());

        assert!(validate(&resource, CapVersion::V1_0).is_valid());
        assert!(validate(&resource, CapVersion::V1_1).is_valid());

        let result = validate(&resource, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "mime_type");
    }

    #[test]
    fn test_update_digest() {
        let mut resource = Resource::new();
        resource.update_digest(b"hello");
        assert_eq!(resource.size, Some(5));
        assert_eq!(
            resource.digest.as_deref(),
            Some("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d")
        );
    }

    #[test]
    fn test_embed_content_round_trips() {
        let mut resource = Resource::new();
        resource.embed_content(b"map bytes");
        assert_eq!(resource.deref_uri.as_deref(), Some("bWFwIGJ5dGVz"));
        assert_eq!(resource.size, Some(12));
        assert_eq!(
            resource.decoded_content().unwrap().unwrap(),
            b"map bytes".to_vec()
        );
    }

    #[test]
    fn test_size_in_kb() {
        let mut resource = Resource::new();
        assert_eq!(resource.size_in_kb(), None);
        resource.size = Some(2048);
        assert_eq!(resource.size_in_kb(), Some(2.0));
    }
}
