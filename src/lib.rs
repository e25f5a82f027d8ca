//! **Fuzzy CPE matching and CVE cross-referencing for certified products.**
//!
//! `cpe-match` connects the noisy product descriptions found in security
//! certification documents to the standardized identifier and vulnerability
//! corpora. It covers two tightly coupled jobs:
//!
//! - **Identifier matching**: turn a `(vendor, product name, versions)`
//!   triple extracted from a certificate into a ranked list of candidate
//!   CPE URIs, using vendor resolution, version pairing and fuzzy string
//!   similarity over an indexed dictionary.
//! - **Vulnerability cross-referencing**: map a set of matched CPE URIs to
//!   the CVE records that apply to it, including compound
//!   "platform AND component" configurations.
//!
//! Document retrieval, PDF/HTML extraction and dataset persistence live in
//! the surrounding pipeline; this crate is the in-memory matching core.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the [`Cpe`] identifier record, the [`Cve`] vulnerability
//!   record and the [`CpeConfiguration`] compound rule, plus the
//!   [`CpeCache`] parse memoizer.
//! - **[`matching`]**: [`CpeIndex`] (vendor/version lookup structures) and
//!   [`CpeMatcher`] (the fuzzy matcher with its single relaxed-retry pass).
//! - **[`vulns`]**: [`CveCorpus`] (owned records, prunable) and
//!   [`CveLookup`] (the frozen uri→CVE index with compound resolution).
//! - **[`parsers`]**: NVD feed JSON ingestion for both corpora.
//!
//! ## Getting Started: Matching a Product
//!
//! ```no_run
//! use cpe_match::{Cpe, CpeIndex, CpeMatcher, ProductQuery};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let records = vec![Cpe::from_uri_with_title(
//!         "cpe:2.3:o:redhat:enterprise_linux:7.1:*:*:*:*:*:*:*",
//!         "Red Hat Enterprise Linux 7.1",
//!     )?];
//!
//!     let index = CpeIndex::build(&records);
//!     let matcher = CpeMatcher::default();
//!     let query = ProductQuery::new("Red Hat", "Red Hat Enterprise Linux", &["7.1"]);
//!
//!     if let Some(matches) = matcher.match_product(&index, &query) {
//!         for uri in matches {
//!             println!("matched {uri}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Cross-Referencing Vulnerabilities
//!
//! ```no_run
//! use cpe_match::{CpeCache, CveLookup, parsers};
//! use std::collections::HashSet;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let feed_json = std::fs::read_to_string("nvdcve-1.1-2021.json")?;
//!     let mut cache = CpeCache::new();
//!     let corpus = parsers::corpus_from_nvd_json(&feed_json, &mut cache)?;
//!
//!     let lookup = CveLookup::build(&corpus);
//!     let matched: HashSet<String> = std::iter::once(
//!         "cpe:2.3:o:redhat:enterprise_linux:7.1:*:*:*:*:*:*:*".to_string(),
//!     )
//!     .collect();
//!
//!     for cve_id in lookup.resolve(&matched) {
//!         println!("affected by {cve_id}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Index and lookup structures are frozen after build and safe to share
//! across threads; [`CpeMatcher::match_products`] fans a batch of queries
//! out over rayon. Mutating operations (corpus pruning, rebuilds) must not
//! run concurrently with readers of the same instance; build a fresh index
//! instead.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // # Errors / # Panics doc sections are aspirational for the public API
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod error;
pub mod matching;
pub mod model;
pub mod parsers;
pub mod vulns;

// Re-export main types for convenience
pub use error::{CpeMatchError, ParseErrorKind, Result};
pub use matching::{
    AliasRule, CpeIndex, CpeMatcher, MatchConfig, ProductQuery, VendorAliasTable, VendorResolver,
    VersionStrategy,
};
pub use model::{BoundKind, Cpe, CpeCache, CpeConfiguration, Cve, CvssMetrics, VersionBound};
pub use vulns::{CompoundMapping, CveCorpus, CveLookup};
