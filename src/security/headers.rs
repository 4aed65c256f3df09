//! Response header mutations produced by the edge router.
//!
//! # Responsibilities
//! - Fixed security headers attached to every pass-through response
//! - Canonical `Link` header
//! - Merge into the downstream response
//!
//! # Design Decisions
//! - Insert-overwrite merge: applying the same set twice is a no-op
//! - Values that are not valid header bytes are skipped, never fatal

use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

pub const X_CONTENT_TYPE_OPTIONS: &str = "X-Content-Type-Options";
pub const X_FRAME_OPTIONS: &str = "X-Frame-Options";
pub const X_XSS_PROTECTION: &str = "X-XSS-Protection";
pub const REFERRER_POLICY: &str = "Referrer-Policy";
pub const LINK: &str = "Link";

/// Security headers present on every pass-through response.
pub const SECURITY_HEADERS: [(&str, &str); 4] = [
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (X_FRAME_OPTIONS, "DENY"),
    (X_XSS_PROTECTION, "1; mode=block"),
    (REFERRER_POLICY, "strict-origin-when-cross-origin"),
];

/// Header name → value mapping to merge into a downstream response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: BTreeMap<&'static str, String>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed security header set.
    pub fn security() -> Self {
        let mut headers = Self::new();
        for (name, value) in SECURITY_HEADERS {
            headers.insert(name, value);
        }
        headers
    }

    pub fn insert(&mut self, name: &'static str, value: impl Into<String>) {
        self.entries.insert(name, value.into());
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Merge into `target`, overwriting same-named headers.
    ///
    /// Returns the number of entries skipped because their value could not
    /// be encoded.
    pub fn apply_to(&self, target: &mut HeaderMap) -> usize {
        let mut skipped = 0;
        for (name, value) in &self.entries {
            let header_name = match HeaderName::from_bytes(name.as_bytes()) {
                Ok(n) => n,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            match HeaderValue::from_str(value) {
                Ok(v) => {
                    target.insert(header_name, v);
                }
                Err(_) => {
                    tracing::warn!(header = %name, "Skipping header with unencodable value");
                    skipped += 1;
                }
            }
        }
        skipped
    }
}
