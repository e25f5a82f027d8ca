//! Vendor/version pairing strategies.
//!
//! Two pairing algorithms coexist upstream: a string-prefix heuristic and a
//! parse-then-intersect variant. The heuristic is the behavior observed in
//! production, so it is the default; the semver intersection is the stricter
//! successor, selectable per configuration. Both are kept behind
//! [`VersionStrategy`] rather than silently picking one.

use crate::matching::index::CpeIndex;
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

/// A version string that plausibly denotes a numeric release.
static NUMERIC_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,5}\.\d{1,5}").expect("static regex"));

/// Which pairing algorithm retrieves candidate (vendor, version) pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionStrategy {
    /// One string starts with the other, with the indexed version required
    /// to look numeric for the prefix direction. Matches the behavior the
    /// production pipeline ships with.
    #[default]
    PrefixHeuristic,
    /// Lenient version parse on both sides, pair on exact intersection.
    /// Stricter and recommended for new deployments.
    SemverIntersection,
}

/// Retrieve the candidate (vendor, version) pairs for a query.
///
/// Iterates vendors in sorted order and indexed versions in insertion
/// order, so the resulting pair list (and everything downstream of it) is
/// deterministic.
pub(crate) fn candidate_pairs(
    index: &CpeIndex,
    vendors: &BTreeSet<String>,
    versions: &[String],
    strategy: VersionStrategy,
) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for vendor in vendors {
        let Some(indexed_versions) = index.versions_for(vendor) else {
            continue;
        };
        match strategy {
            VersionStrategy::PrefixHeuristic => {
                pairs.extend(
                    indexed_versions
                        .iter()
                        .filter(|indexed| prefix_matches(indexed, versions))
                        .map(|indexed| (vendor.clone(), indexed.clone())),
                );
            }
            VersionStrategy::SemverIntersection => {
                let query_keys: HashSet<VersionKey> =
                    versions.iter().map(|v| VersionKey::parse_lenient(v)).collect();
                pairs.extend(
                    indexed_versions
                        .iter()
                        .filter(|indexed| query_keys.contains(&VersionKey::parse_lenient(indexed)))
                        .map(|indexed| (vendor.clone(), indexed.clone())),
                );
            }
        }
    }
    pairs
}

/// The production prefix predicate: an indexed version pairs with a query
/// version when the query starts with it (and it looks numeric), or when it
/// starts with the query.
fn prefix_matches(indexed_version: &str, query_versions: &[String]) -> bool {
    query_versions.iter().any(|query| {
        (query.starts_with(indexed_version) && NUMERIC_VERSION.is_match(indexed_version))
            || indexed_version.starts_with(query.as_str())
    })
}

/// Lenient version key: semver where possible, opaque literal otherwise.
///
/// Short numeric forms ("7", "7.1") are padded to full semver so the same
/// release compares equal whichever form a feed spelled it in. Anything
/// unparseable (including the `"-"` wildcard) compares as a lowercased
/// literal, so wildcard queries still pair with wildcard index entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum VersionKey {
    Semver(Version),
    Literal(String),
}

impl VersionKey {
    fn parse_lenient(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(version) = Version::parse(trimmed) {
            return Self::Semver(version);
        }

        let parts: Vec<&str> = trimmed.split('.').collect();
        let all_numeric = !parts.is_empty()
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
        if all_numeric && parts.len() < 3 {
            let padded = match parts.len() {
                1 => format!("{}.0.0", parts[0]),
                _ => format!("{}.{}.0", parts[0], parts[1]),
            };
            if let Ok(version) = Version::parse(&padded) {
                return Self::Semver(version);
            }
        }

        Self::Literal(trimmed.to_lowercase())
    }
}
