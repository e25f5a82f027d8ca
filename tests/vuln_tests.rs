//! Integration tests for vulnerability cross-referencing.
//!
//! Fixture data mirrors real records: a direct Red Hat CVE, an unrelated
//! IBM SKLM CVE, and the z/OS + WebSphere compound configuration.

use chrono::{TimeZone, Utc};
use cpe_match::{
    Cpe, CpeConfiguration, CpeIndex, CpeMatcher, CveCorpus, CveLookup, Cve, CvssMetrics,
    ProductQuery,
};
use std::collections::{BTreeSet, HashSet};

// ============================================================================
// Fixtures
// ============================================================================

const RHEL_71: &str = "cpe:2.3:o:redhat:enterprise_linux:7.1:*:*:*:*:*:*:*";
const SKLM: &str = "cpe:2.3:a:ibm:security_key_lifecycle_manager:2.6.0.1:*:*:*:*:*:*:*";
const ZOS: &str = "cpe:2.3:o:ibm:zos:*:*:*:*:*:*:*:*";
const WAS_ANY: &str = "cpe:2.3:a:ibm:websphere_application_server:*:*:*:*:*:*:*:*";
const WAS_701: &str = "cpe:2.3:a:ibm:websphere_application_server:7.0.0.1:*:*:*:*:*:*:*";

fn cpe(uri: &str) -> Cpe {
    Cpe::from_uri(uri).expect("valid fixture CPE")
}

fn rhel_cve() -> Cve {
    Cve::new(
        "CVE-1234-123456",
        vec![cpe(RHEL_71)],
        vec![],
        CvssMetrics::new(10.0, "HIGH", 10.0, 10.0),
        Some(Utc.with_ymd_and_hms(2021, 5, 26, 4, 15, 0).single().expect("valid date")),
        BTreeSet::from(["CWE-200".to_string()]),
    )
}

fn sklm_cve() -> Cve {
    Cve::new(
        "CVE-2019-4513",
        vec![cpe(SKLM)],
        vec![],
        CvssMetrics::new(8.2, "HIGH", 3.9, 4.2),
        Some(Utc.with_ymd_and_hms(2000, 5, 26, 4, 15, 0).single().expect("valid date")),
        BTreeSet::new(),
    )
}

fn ibm_xss_cve() -> Cve {
    Cve::new(
        "CVE-2010-2325",
        vec![],
        vec![CpeConfiguration::new(
            cpe(ZOS),
            vec![cpe(WAS_701), cpe(WAS_ANY)],
        )],
        CvssMetrics::new(4.3, "MEDIUM", 2.9, 8.6),
        Some(Utc.with_ymd_and_hms(2000, 6, 18, 4, 15, 0).single().expect("valid date")),
        BTreeSet::from(["CWE-79".to_string()]),
    )
}

fn corpus() -> CveCorpus {
    CveCorpus::from_cves([rhel_cve(), sklm_cve(), ibm_xss_cve()])
}

fn uris(values: &[&str]) -> HashSet<String> {
    values.iter().map(ToString::to_string).collect()
}

fn ids(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(ToString::to_string).collect()
}

// ============================================================================
// Resolution
// ============================================================================

mod resolution {
    use super::*;

    #[test]
    fn test_exact_resolution() {
        let lookup = CveLookup::build(&corpus());
        assert_eq!(lookup.resolve(&uris(&[RHEL_71])), ids(&["CVE-1234-123456"]));
        assert_eq!(lookup.resolve(&uris(&[SKLM])), ids(&["CVE-2019-4513"]));
    }

    #[test]
    fn test_unknown_uri_is_empty_not_error() {
        let lookup = CveLookup::build(&corpus());
        assert!(lookup
            .resolve(&uris(&["cpe:2.3:a:nobody:nothing:1.0:*:*:*:*:*:*:*"]))
            .is_empty());
    }

    #[test]
    fn test_compound_platform_and_component() {
        let lookup = CveLookup::build(&corpus());
        assert_eq!(
            lookup.resolve(&uris(&[ZOS, WAS_ANY])),
            ids(&["CVE-2010-2325"]),
            "platform + one component must surface the compound record"
        );
    }

    #[test]
    fn test_compound_component_alone_is_empty() {
        let lookup = CveLookup::build(&corpus());
        assert!(
            lookup.resolve(&uris(&[WAS_ANY])).is_empty(),
            "a component without its platform must not match"
        );
        assert!(lookup.resolve(&uris(&[WAS_701])).is_empty());
    }

    #[test]
    fn test_union_of_exact_and_compound() {
        let lookup = CveLookup::build(&corpus());
        assert_eq!(
            lookup.resolve(&uris(&[RHEL_71, ZOS, WAS_ANY])),
            ids(&["CVE-1234-123456", "CVE-2010-2325"])
        );
    }
}

// ============================================================================
// Pruning
// ============================================================================

mod pruning {
    use super::*;

    #[test]
    fn test_prune_then_rebuild_lookup() {
        let mut pruned = corpus();
        pruned.prune_to_relevant_identifiers(&uris(&[RHEL_71]));

        let lookup = CveLookup::build(&pruned);
        assert_eq!(lookup.resolve(&uris(&[RHEL_71])), ids(&["CVE-1234-123456"]));
        assert!(
            lookup.resolve(&uris(&[SKLM])).is_empty(),
            "pruned identifiers are gone after rebuild"
        );
        assert!(lookup.resolve(&uris(&[ZOS, WAS_ANY])).is_empty());
    }

    #[test]
    fn test_prune_keeps_compound_when_satisfiable() {
        let mut pruned = corpus();
        pruned.prune_to_relevant_identifiers(&uris(&[ZOS, WAS_ANY]));

        let lookup = CveLookup::build(&pruned);
        assert_eq!(
            lookup.resolve(&uris(&[ZOS, WAS_ANY])),
            ids(&["CVE-2010-2325"])
        );
        assert_eq!(pruned.len(), 1, "records emptied by the prune are deleted");
    }
}

// ============================================================================
// Matcher → lookup pipeline
// ============================================================================

mod pipeline {
    use super::*;

    #[test]
    fn test_certificate_to_vulnerabilities() {
        // The full path a certificate takes: fuzzy match against the
        // dictionary, then cross-reference the matched URIs
        let dictionary = vec![
            Cpe::from_uri_with_title(RHEL_71, "Red Hat Enterprise Linux 7.1")
                .expect("valid fixture CPE"),
            Cpe::from_uri_with_title(SKLM, "IBM Security Key Lifecycle Manager 2.6.0.1")
                .expect("valid fixture CPE"),
        ];
        let index = CpeIndex::build(&dictionary);
        let matcher = CpeMatcher::default();

        let query = ProductQuery::new("Red Hat", "Red Hat Enterprise Linux", &["7.1"]);
        let matched: HashSet<String> = matcher
            .match_product(&index, &query)
            .expect("certificate matches the dictionary")
            .into_iter()
            .collect();

        let lookup = CveLookup::build(&corpus());
        assert_eq!(lookup.resolve(&matched), ids(&["CVE-1234-123456"]));
    }
}
