//! CPE identifier records.
//!
//! A [`Cpe`] is the parsed form of a CPE 2.3 identifier key. The key follows
//! a fixed segmented scheme:
//!
//! ```text
//! cpe:2.3:type:vendor:product:version:update:edition:language:sw_edition:target_sw:target_hw:other
//! ```
//!
//! The matcher only depends on the vendor, product and version segments plus
//! an optional free-text title attached by the dictionary feed. Records are
//! equal and hash by URI alone.

use crate::error::{CpeMatchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Number of colon-separated segments in a CPE 2.3 identifier key.
const CPE23_SEGMENTS: usize = 13;

/// Version boundary kind for CPE version ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundKind {
    Including,
    Excluding,
}

/// One end of a version range attached to an identifier record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionBound {
    pub kind: BoundKind,
    pub value: String,
}

impl VersionBound {
    pub fn including(value: impl Into<String>) -> Self {
        Self {
            kind: BoundKind::Including,
            value: value.into(),
        }
    }

    pub fn excluding(value: impl Into<String>) -> Self {
        Self {
            kind: BoundKind::Excluding,
            value: value.into(),
        }
    }
}

/// A single identifier record from the CPE dictionary.
///
/// Immutable once constructed. Equality, hashing and ordering consider the
/// URI only, so two records with the same key but different titles or bounds
/// are interchangeable in sets and map keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpe {
    pub uri: String,
    pub title: Option<String>,
    pub vendor: String,
    pub item_name: String,
    pub version: String,
    pub start_version: Option<VersionBound>,
    pub end_version: Option<VersionBound>,
}

impl Cpe {
    /// Parse an identifier record from its CPE 2.3 URI.
    ///
    /// Rejects keys that do not carry all 13 segments; a malformed key is
    /// never admitted into an index silently.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let segments = split_uri(uri);
        if segments.len() != CPE23_SEGMENTS {
            return Err(CpeMatchError::invalid_cpe_uri(
                uri,
                format!("expected {CPE23_SEGMENTS} segments, got {}", segments.len()),
            ));
        }
        if segments[0] != "cpe" || segments[1] != "2.3" {
            return Err(CpeMatchError::invalid_cpe_uri(uri, "missing cpe:2.3 prefix"));
        }

        Ok(Self {
            uri: uri.to_string(),
            title: None,
            vendor: segments[3].clone(),
            item_name: segments[4].clone(),
            version: segments[5].clone(),
            start_version: None,
            end_version: None,
        })
    }

    /// Parse an identifier record and attach the dictionary title.
    pub fn from_uri_with_title(uri: &str, title: impl Into<String>) -> Result<Self> {
        let mut cpe = Self::from_uri(uri)?;
        cpe.title = Some(title.into());
        Ok(cpe)
    }

    /// Attach version-range bounds (used by the compound-mapping feed keys).
    #[must_use]
    pub fn with_version_bounds(
        mut self,
        start: Option<VersionBound>,
        end: Option<VersionBound>,
    ) -> Self {
        self.start_version = start;
        self.end_version = end;
        self
    }
}

impl PartialEq for Cpe {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for Cpe {}

impl Hash for Cpe {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl PartialOrd for Cpe {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cpe {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.uri.cmp(&other.uri)
    }
}

/// Split a CPE 2.3 URI on unescaped colons.
///
/// Segment values may contain `\:`-escaped separators (and other escaped
/// punctuation such as `\*`); escapes are kept verbatim in the segment text.
fn split_uri(uri: &str) -> Vec<String> {
    let mut segments = Vec::with_capacity(CPE23_SEGMENTS);
    let mut current = String::new();
    let mut escaped = false;

    for c in uri.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            ':' => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

/// Memoization cache for parsed identifier records.
///
/// Dictionary and vulnerability feeds repeat the same URIs many times over;
/// interning through this cache parses each key once. Records are
/// deduplicated by URI (the first parse wins). The cache has no eviction and
/// lives as long as its owner; [`CpeCache::reset`] clears it explicitly.
#[derive(Debug, Default)]
pub struct CpeCache {
    entries: HashMap<String, Arc<Cpe>>,
}

impl CpeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a URI, or return the previously parsed record for it.
    pub fn intern(&mut self, uri: &str) -> Result<Arc<Cpe>> {
        if let Some(cached) = self.entries.get(uri) {
            return Ok(Arc::clone(cached));
        }
        let parsed = Arc::new(Cpe::from_uri(uri)?);
        self.entries.insert(uri.to_string(), Arc::clone(&parsed));
        Ok(parsed)
    }

    /// Parse a URI with version-range bounds attached.
    ///
    /// Bounds only apply when the record is first parsed; a URI already in
    /// the cache is returned as-is.
    pub fn intern_with_bounds(
        &mut self,
        uri: &str,
        start: Option<VersionBound>,
        end: Option<VersionBound>,
    ) -> Result<Arc<Cpe>> {
        if let Some(cached) = self.entries.get(uri) {
            return Ok(Arc::clone(cached));
        }
        let parsed = Arc::new(Cpe::from_uri(uri)?.with_version_bounds(start, end));
        self.entries.insert(uri.to_string(), Arc::clone(&parsed));
        Ok(parsed)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached record.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
