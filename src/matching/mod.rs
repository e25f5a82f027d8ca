//! Fuzzy matching of certificate products to CPE identifiers.
//!
//! A query is the noisy `(vendor, product name, version strings)` triple
//! heuristically extracted from a certification document. Matching runs in
//! four stages:
//!
//! 1. Normalize the vendor and product name ([`normalize`]).
//! 2. Resolve the vendor string to canonical vendor keys ([`vendors`]).
//! 3. Retrieve candidate records from the (vendor, version) buckets of the
//!    index ([`index`], [`versions`]).
//! 4. Score each candidate with the maximum of four similarity metrics
//!    ([`similarity`]) and keep the ones above threshold.
//!
//! The version-strict first pass only accepts perfect scores; when it comes
//! up empty the whole algorithm reruns exactly once with the wildcard
//! version `"-"` and the configured threshold. There is no deeper retry.
//!
//! # Example
//!
//! ```ignore
//! use cpe_match::{CpeIndex, CpeMatcher, ProductQuery};
//!
//! let index = CpeIndex::build(&records);
//! let matcher = CpeMatcher::default();
//! let query = ProductQuery::new("Red Hat", "Red Hat Enterprise Linux", &["7.1"]);
//! let matches = matcher.match_product(&index, &query);
//! ```

pub mod config;
pub mod index;
pub mod normalize;
pub mod similarity;
pub mod vendors;
pub mod versions;

pub use config::MatchConfig;
pub use index::CpeIndex;
pub use vendors::{AliasRule, VendorAliasTable, VendorResolver};
pub use versions::VersionStrategy;

use crate::model::Cpe;
use normalize::{fully_sanitize, strip_trademark_symbols, strip_vendors_and_versions};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use similarity::{partial_ratio, token_set_ratio};
use std::collections::BTreeSet;
use tracing::debug;

/// The wildcard version used by the relaxed retry pass.
const WILDCARD_VERSION: &str = "-";

/// A per-product match query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Raw vendor string from the certificate, if any
    pub vendor: Option<String>,
    /// Raw product name from the certificate, if any
    pub name: Option<String>,
    /// Version strings heuristically extracted from the product name
    pub versions: Vec<String>,
}

impl ProductQuery {
    pub fn new(vendor: impl Into<String>, name: impl Into<String>, versions: &[&str]) -> Self {
        Self {
            vendor: Some(vendor.into()),
            name: Some(name.into()),
            versions: versions.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Fuzzy matcher from product queries to ranked identifier URIs.
#[must_use]
pub struct CpeMatcher {
    config: MatchConfig,
    alias_table: VendorAliasTable,
}

impl CpeMatcher {
    /// Create a matcher with the given configuration
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            alias_table: VendorAliasTable::with_builtins(),
        }
    }

    /// Replace the vendor alias table
    pub fn with_alias_table(mut self, table: VendorAliasTable) -> Self {
        self.alias_table = table;
        self
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match one product query against a built index.
    ///
    /// Returns the top `n_max_matches` identifier URIs in descending score
    /// order (ties keep candidate enumeration order), or `None` when neither
    /// the strict pass nor the single relaxed retry produced a match. An
    /// unresolvable vendor or an unknown (vendor, version) pair yields
    /// `None`, never an error.
    #[must_use]
    pub fn match_product(&self, index: &CpeIndex, query: &ProductQuery) -> Option<Vec<String>> {
        self.match_product_pass(index, query, self.config.relax_version)
    }

    /// Match a batch of product queries in parallel.
    ///
    /// The index is read-only during matching, so queries fan out across
    /// the rayon pool with no shared mutable state.
    #[must_use]
    pub fn match_products(
        &self,
        index: &CpeIndex,
        queries: &[ProductQuery],
    ) -> Vec<Option<Vec<String>>> {
        queries
            .par_iter()
            .map(|query| self.match_product(index, query))
            .collect()
    }

    fn match_product_pass(
        &self,
        index: &CpeIndex,
        query: &ProductQuery,
        relax: bool,
    ) -> Option<Vec<String>> {
        let sanitized_vendor = query
            .vendor
            .as_deref()
            .map(|v| strip_trademark_symbols(v).to_lowercase());
        let sanitized_name = query.name.as_deref().map(fully_sanitize);

        let resolver = VendorResolver::new(index.vendors(), &self.alias_table);
        let candidate_vendors = sanitized_vendor
            .as_deref()
            .and_then(|vendor| resolver.resolve(vendor));

        let candidates = self.candidate_records(index, candidate_vendors.as_ref(), &query.versions);

        // The strict pass only accepts perfect scores; the configured
        // threshold applies to the relaxed pass and to non-relaxing calls.
        let threshold = if relax {
            100.0
        } else {
            self.config.match_threshold
        };

        let mut scored: Vec<(f64, &Cpe)> = candidates
            .iter()
            .map(|cpe| {
                (
                    self.score_candidate(
                        cpe,
                        sanitized_name.as_deref().unwrap_or(""),
                        candidate_vendors.as_ref(),
                        &query.versions,
                    ),
                    *cpe,
                )
            })
            .filter(|(score, _)| *score >= threshold)
            .collect();

        if relax && scored.is_empty() {
            debug!(
                vendor = ?query.vendor,
                name = ?query.name,
                "strict pass empty, retrying with wildcard version"
            );
            let relaxed = ProductQuery {
                versions: vec![WILDCARD_VERSION.to_string()],
                ..query.clone()
            };
            return self.match_product_pass(index, &relaxed, false);
        }
        if scored.is_empty() {
            return None;
        }

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Some(
            scored
                .into_iter()
                .take(self.config.n_max_matches)
                .map(|(_, cpe)| cpe.uri.clone())
                .collect(),
        )
    }

    /// Union of the records bucketed under every matched (vendor, version)
    /// pair. No resolved vendors means an empty pool.
    fn candidate_records<'i>(
        &self,
        index: &'i CpeIndex,
        candidate_vendors: Option<&BTreeSet<String>>,
        versions: &[String],
    ) -> Vec<&'i Cpe> {
        let Some(vendors) = candidate_vendors else {
            return Vec::new();
        };
        let pairs =
            versions::candidate_pairs(index, vendors, versions, self.config.version_strategy);
        pairs
            .iter()
            .flat_map(|(vendor, version)| index.records_for(vendor, version))
            .collect()
    }

    /// Similarity of one candidate to the query: the maximum of token-set
    /// and partial ratios against the record title, and the same pair of
    /// ratios between the vendor/version-stripped product name and the
    /// record item name. A record without a title falls back to
    /// "vendor item_name version".
    fn score_candidate(
        &self,
        cpe: &Cpe,
        product_name: &str,
        candidate_vendors: Option<&BTreeSet<String>>,
        versions: &[String],
    ) -> f64 {
        let sanitized_title = cpe.title.as_deref().map_or_else(
            || fully_sanitize(&format!("{} {} {}", cpe.vendor, cpe.item_name, cpe.version)),
            fully_sanitize,
        );
        let sanitized_item_name = fully_sanitize(&cpe.item_name);

        let vendor_fragments: Vec<&str> = candidate_vendors
            .map(|vendors| vendors.iter().map(String::as_str).collect())
            .unwrap_or_default();
        let stripped_name =
            strip_vendors_and_versions(product_name, &vendor_fragments, versions);

        [
            token_set_ratio(product_name, &sanitized_title),
            partial_ratio(product_name, &sanitized_title),
            token_set_ratio(&stripped_name, &sanitized_item_name),
            partial_ratio(&stripped_name, &sanitized_item_name),
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }
}

impl Default for CpeMatcher {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpe(uri: &str, title: &str) -> Cpe {
        Cpe::from_uri_with_title(uri, title).expect("valid test CPE")
    }

    fn rhel_index() -> CpeIndex {
        let records = vec![
            cpe(
                "cpe:2.3:o:redhat:enterprise_linux:7.1:*:*:*:*:*:*:*",
                "Red Hat Enterprise Linux 7.1",
            ),
            cpe(
                "cpe:2.3:o:redhat:enterprise_linux:8.0:*:*:*:*:*:*:*",
                "Red Hat Enterprise Linux 8.0",
            ),
            cpe(
                "cpe:2.3:a:ibm:security_key_lifecycle_manager:2.6.0.1:*:*:*:*:*:*:*",
                "IBM Security Key Lifecycle Manager 2.6.0.1",
            ),
        ];
        CpeIndex::build(&records)
    }

    #[test]
    fn test_exact_version_match() {
        let matcher = CpeMatcher::default();
        let query = ProductQuery::new("Red Hat", "Red Hat Enterprise Linux", &["7.1"]);

        let matches = matcher
            .match_product(&rhel_index(), &query)
            .expect("strict pass finds the 7.1 record");
        assert_eq!(
            matches,
            vec!["cpe:2.3:o:redhat:enterprise_linux:7.1:*:*:*:*:*:*:*"]
        );
    }

    #[test]
    fn test_unresolvable_vendor_is_none() {
        let matcher = CpeMatcher::default();
        let query = ProductQuery::new("Unknown Vendor GmbH", "Some Product", &["1.0"]);
        assert_eq!(matcher.match_product(&rhel_index(), &query), None);
    }

    #[test]
    fn test_missing_vendor_is_none() {
        let matcher = CpeMatcher::default();
        let query = ProductQuery {
            vendor: None,
            name: Some("Red Hat Enterprise Linux".to_string()),
            versions: vec!["7.1".to_string()],
        };
        assert_eq!(matcher.match_product(&rhel_index(), &query), None);
    }

    #[test]
    fn test_unknown_version_without_relax_is_none() {
        let matcher = CpeMatcher::new(MatchConfig {
            relax_version: false,
            ..MatchConfig::default()
        });
        let query = ProductQuery::new("Red Hat", "Red Hat Enterprise Linux", &["9.9"]);
        assert_eq!(matcher.match_product(&rhel_index(), &query), None);
    }

    #[test]
    fn test_relaxed_retry_hits_wildcard_record() {
        let records = vec![
            cpe(
                "cpe:2.3:a:gemalto:safenet_authentication_service:-:*:*:*:*:*:*:*",
                "Gemalto SafeNet Authentication Service",
            ),
            cpe(
                "cpe:2.3:a:gemalto:safenet_authentication_service:3.4:*:*:*:*:*:*:*",
                "Gemalto SafeNet Authentication Service 3.4",
            ),
        ];
        let index = CpeIndex::build(&records);

        let matcher = CpeMatcher::default();
        // Version 9.9 exists nowhere: the strict pass is empty and the
        // wildcard retry reaches the "-" record
        let query =
            ProductQuery::new("Gemalto", "SafeNet Authentication Service", &["9.9"]);
        let matches = matcher.match_product(&index, &query).expect("relaxed match");
        assert_eq!(
            matches,
            vec!["cpe:2.3:a:gemalto:safenet_authentication_service:-:*:*:*:*:*:*:*"]
        );
    }

    #[test]
    fn test_threshold_monotonicity() {
        // The wildcard record scores ~89 against the query, so the relaxed
        // pass flips from match to no-match as the threshold crosses it
        let records = vec![cpe(
            "cpe:2.3:a:acme:gadget_server:-:*:*:*:*:*:*:*",
            "Acme Gadget Server",
        )];
        let index = CpeIndex::build(&records);
        let query = ProductQuery::new("acme", "Acme Widget Server", &["7.7"]);

        let mut previous_len = usize::MAX;
        for threshold in [60.0, 80.0, 95.0, 100.0] {
            let matcher = CpeMatcher::new(MatchConfig {
                match_threshold: threshold,
                ..MatchConfig::default()
            });
            let len = matcher
                .match_product(&index, &query)
                .map_or(0, |matches| matches.len());
            assert!(
                len <= previous_len,
                "raising the threshold must never grow the match set"
            );
            previous_len = len;
        }
        assert_eq!(previous_len, 0, "a perfect-score bar must reject ~89");
    }

    #[test]
    fn test_cardinality_cap() {
        let records: Vec<Cpe> = (0..30)
            .map(|i| {
                cpe(
                    &format!("cpe:2.3:a:acme:widget_server:1.{i}:*:*:*:*:*:*:*"),
                    "Acme Widget Server",
                )
            })
            .collect();
        let index = CpeIndex::build(&records);

        let matcher = CpeMatcher::new(MatchConfig {
            n_max_matches: 5,
            ..MatchConfig::default()
        });
        // Wildcard-free query matching every 1.x record via the prefix rule
        let query = ProductQuery::new("acme", "Acme Widget Server", &["1."]);
        let matches = matcher.match_product(&index, &query).expect("matches");
        assert_eq!(matches.len(), 5, "cap must bound the result length");
    }

    #[test]
    fn test_ranking_is_descending() {
        let records = vec![
            cpe(
                "cpe:2.3:a:acme:gadget_deluxe_pro:1.0:*:*:*:*:*:*:*",
                "Acme Gadget Deluxe Pro 1.0",
            ),
            cpe(
                "cpe:2.3:a:acme:widget_server:1.0:*:*:*:*:*:*:*",
                "Acme Widget Server 1.0",
            ),
        ];
        let index = CpeIndex::build(&records);

        let matcher = CpeMatcher::new(MatchConfig {
            match_threshold: 40.0,
            relax_version: false,
            ..MatchConfig::default()
        });
        let query = ProductQuery::new("acme", "Acme Widget Server", &["1.0"]);
        let matches = matcher.match_product(&index, &query).expect("matches");

        assert_eq!(
            matches[0], "cpe:2.3:a:acme:widget_server:1.0:*:*:*:*:*:*:*",
            "the perfect-scoring record must outrank the weaker one \
             even though it was enumerated second"
        );
    }

    #[test]
    fn test_batch_matches_parallel() {
        let matcher = CpeMatcher::default();
        let index = rhel_index();
        let queries = vec![
            ProductQuery::new("Red Hat", "Red Hat Enterprise Linux", &["7.1"]),
            ProductQuery::new("Nobody", "No Product", &["0.0"]),
        ];

        let results = matcher.match_products(&index, &queries);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_some());
        assert!(results[1].is_none());
    }

    #[test]
    fn test_trademark_symbols_ignored() {
        let matcher = CpeMatcher::default();
        let query = ProductQuery::new("Red Hat®", "Red Hat® Enterprise Linux™", &["7.1"]);
        assert!(matcher.match_product(&rhel_index(), &query).is_some());
    }
}
