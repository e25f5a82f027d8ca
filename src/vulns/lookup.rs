//! Frozen lookup index from identifier URIs to vulnerability ids.

use crate::model::{Cpe, CpeConfiguration};
use crate::vulns::corpus::CveCorpus;
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Mapping from one "complex" identifier key to its constituent simple
/// identifiers, sourced from the authoritative match feed.
pub type CompoundMapping = HashMap<String, Vec<Arc<Cpe>>>;

/// One compound-bearing record, carried out of the corpus at build time.
#[derive(Debug, Clone)]
struct CompoundEntry {
    cve_id: String,
    configurations: Vec<CpeConfiguration>,
}

/// Derived lookup over a CVE corpus snapshot.
///
/// Owns everything it needs: the uri→ids map plus copies of the compound
/// configurations. Once built it is immutable and safe to share across
/// concurrent readers. It does not observe later corpus mutations; rebuild
/// after pruning or reloading.
#[derive(Debug, Default)]
pub struct CveLookup {
    cpe_to_cve_ids: IndexMap<String, IndexSet<String>>,
    compound: Vec<CompoundEntry>,
}

impl CveLookup {
    /// Build the lookup with identifiers indexed as-is (unexpanded mode).
    #[must_use]
    pub fn build(corpus: &CveCorpus) -> Self {
        Self::build_with_mapping(corpus, None)
    }

    /// Build the lookup, optionally expanding identifiers through a
    /// compound mapping.
    ///
    /// With a mapping, every direct identifier is replaced by its
    /// constituent simple identifiers before indexing. Identifiers absent
    /// from the mapping are dropped: a small fixed number of upstream feed
    /// entries are malformed and never appear as mapping keys. The drop is
    /// logged at debug level and is not an error.
    #[must_use]
    pub fn build_with_mapping(corpus: &CveCorpus, mapping: Option<&CompoundMapping>) -> Self {
        let mut cpe_to_cve_ids: IndexMap<String, IndexSet<String>> = IndexMap::new();
        let mut dropped = 0usize;

        for cve in corpus.iter() {
            for direct in &cve.vulnerable_cpes {
                match mapping {
                    Some(map) => match map.get(&direct.uri) {
                        Some(expanded) => {
                            for simple in expanded {
                                cpe_to_cve_ids
                                    .entry(simple.uri.clone())
                                    .or_default()
                                    .insert(cve.cve_id.clone());
                            }
                        }
                        None => {
                            dropped += 1;
                            debug!(
                                uri = %direct.uri,
                                cve = %cve.cve_id,
                                "identifier absent from compound mapping, dropped"
                            );
                        }
                    },
                    None => {
                        cpe_to_cve_ids
                            .entry(direct.uri.clone())
                            .or_default()
                            .insert(cve.cve_id.clone());
                    }
                }
            }
        }

        let compound: Vec<CompoundEntry> = corpus
            .iter()
            .filter(|cve| !cve.vulnerable_cpe_configurations.is_empty())
            .map(|cve| CompoundEntry {
                cve_id: cve.cve_id.clone(),
                configurations: cve.vulnerable_cpe_configurations.clone(),
            })
            .collect();

        info!(
            identifiers = cpe_to_cve_ids.len(),
            compound_records = compound.len(),
            dropped,
            "built CVE lookup index"
        );
        Self {
            cpe_to_cve_ids,
            compound,
        }
    }

    /// Vulnerability ids directly associated with one identifier URI.
    ///
    /// An unknown URI yields an empty iterator, not an error.
    pub fn cve_ids_for(&self, uri: &str) -> impl Iterator<Item = &str> {
        self.cpe_to_cve_ids
            .get(uri)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Resolve a set of matched identifier URIs to the vulnerabilities that
    /// apply to it.
    ///
    /// The union of the exact per-URI lookups and of every compound-bearing
    /// record with at least one satisfied configuration.
    #[must_use]
    pub fn resolve(&self, uris: &HashSet<String>) -> BTreeSet<String> {
        let mut ids: BTreeSet<String> = uris
            .iter()
            .flat_map(|uri| self.cve_ids_for(uri))
            .map(ToString::to_string)
            .collect();

        ids.extend(
            self.compound
                .iter()
                .filter(|entry| {
                    entry
                        .configurations
                        .iter()
                        .any(|config| config.matches(uris))
                })
                .map(|entry| entry.cve_id.clone()),
        );
        ids
    }

    /// Number of distinct identifier URIs in the exact-lookup map.
    #[must_use]
    pub fn identifier_count(&self) -> usize {
        self.cpe_to_cve_ids.len()
    }

    /// Number of records carrying at least one compound configuration.
    #[must_use]
    pub fn compound_record_count(&self) -> usize {
        self.compound.len()
    }
}
