//! Owned collection of vulnerability records.

use crate::model::Cve;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// A loaded CVE corpus, keyed by uppercased CVE id.
///
/// The corpus owns its records. Derived lookup structures
/// ([`crate::vulns::CveLookup`]) are built from a corpus snapshot and must
/// be rebuilt after any mutation here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CveCorpus {
    cves: IndexMap<String, Cve>,
}

impl CveCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cves(cves: impl IntoIterator<Item = Cve>) -> Self {
        let mut corpus = Self::new();
        for cve in cves {
            corpus.insert(cve);
        }
        corpus
    }

    /// Insert a record, replacing any record with the same id.
    pub fn insert(&mut self, cve: Cve) {
        self.cves.insert(cve.cve_id.to_uppercase(), cve);
    }

    /// Case-insensitive lookup by CVE id.
    #[must_use]
    pub fn get(&self, cve_id: &str) -> Option<&Cve> {
        self.cves.get(&cve_id.to_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cve> {
        self.cves.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cves.is_empty()
    }

    /// Destructively restrict the corpus to a set of relevant identifiers.
    ///
    /// Drops, from every record, direct identifiers outside `relevant` and
    /// compound configurations whose platform or entire component list fall
    /// outside it. Records left referencing nothing are deleted. One-way:
    /// callers that need the full corpus later must keep an unpruned copy.
    /// Any lookup built from this corpus is stale after this call.
    pub fn prune_to_relevant_identifiers(&mut self, relevant: &HashSet<String>) {
        let mut deleted_cpes = 0usize;
        let mut deleted_ids: Vec<String> = Vec::new();

        for (key, cve) in &mut self.cves {
            let direct_before = cve.vulnerable_cpes.len();
            cve.vulnerable_cpes.retain(|cpe| relevant.contains(&cpe.uri));
            cve.vulnerable_cpe_configurations.retain(|config| {
                relevant.contains(&config.platform.uri)
                    && config
                        .components
                        .iter()
                        .any(|component| relevant.contains(&component.uri))
            });
            for config in &mut cve.vulnerable_cpe_configurations {
                config
                    .components
                    .retain(|component| relevant.contains(&component.uri));
            }
            deleted_cpes += direct_before - cve.vulnerable_cpes.len();

            if cve.vulnerable_cpes.is_empty() && cve.vulnerable_cpe_configurations.is_empty() {
                deleted_ids.push(key.clone());
            }
        }

        for key in &deleted_ids {
            self.cves.shift_remove(key);
        }
        info!(
            deleted_cpes,
            deleted_cves = deleted_ids.len(),
            remaining = self.cves.len(),
            "pruned CVE corpus to relevant identifiers"
        );
    }
}

impl IntoIterator for CveCorpus {
    type Item = Cve;
    type IntoIter = indexmap::map::IntoValues<String, Cve>;

    fn into_iter(self) -> Self::IntoIter {
        self.cves.into_values()
    }
}
