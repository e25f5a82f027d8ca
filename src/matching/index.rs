//! Identifier index for sub-linear candidate retrieval.
//!
//! Bucketing the dictionary by vendor and by (vendor, version) lets the
//! matcher score a handful of candidates per query instead of the whole
//! corpus. The index is rebuilt wholesale from a corpus snapshot; there is
//! deliberately no incremental update path.

use crate::model::Cpe;
use indexmap::{IndexMap, IndexSet};
use tracing::info;

/// Records with an item name this short or shorter are excluded from the
/// index; they produce unacceptable false-positive rates.
const MAX_EXCLUDED_ITEM_NAME_CHARS: usize = 3;

/// Lookup structures over the identifier corpus.
///
/// Insertion-ordered maps keep candidate enumeration deterministic, which
/// is what makes the matcher's tie-break stable.
#[derive(Debug, Default)]
pub struct CpeIndex {
    vendors: IndexSet<String>,
    vendor_to_versions: IndexMap<String, IndexSet<String>>,
    vendor_version_to_cpes: IndexMap<(String, String), IndexSet<Cpe>>,
    indexed_records: usize,
}

impl CpeIndex {
    /// Build the index from an identifier corpus.
    ///
    /// Filters out records with `item_name` of 3 characters or fewer, then
    /// buckets the rest by vendor and by (vendor, version). Building again
    /// from a changed corpus means calling this again; prior state is not
    /// reused.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Cpe>,
    {
        let mut index = Self::default();

        for cpe in records {
            if cpe.item_name.chars().count() <= MAX_EXCLUDED_ITEM_NAME_CHARS {
                continue;
            }
            index.vendors.insert(cpe.vendor.clone());
            index
                .vendor_to_versions
                .entry(cpe.vendor.clone())
                .or_default()
                .insert(cpe.version.clone());
            let inserted = index
                .vendor_version_to_cpes
                .entry((cpe.vendor.clone(), cpe.version.clone()))
                .or_default()
                .insert(cpe.clone());
            if inserted {
                index.indexed_records += 1;
            }
        }

        info!(
            vendors = index.vendors.len(),
            records = index.indexed_records,
            "built identifier index"
        );
        index
    }

    /// Canonical vendor keys present in the index.
    #[must_use]
    pub fn vendors(&self) -> &IndexSet<String> {
        &self.vendors
    }

    /// All versions indexed for a vendor.
    #[must_use]
    pub fn versions_for(&self, vendor: &str) -> Option<&IndexSet<String>> {
        self.vendor_to_versions.get(vendor)
    }

    /// All records indexed under a (vendor, version) pair.
    ///
    /// An unknown pair yields an empty iterator, not an error.
    pub fn records_for(&self, vendor: &str, version: &str) -> impl Iterator<Item = &Cpe> {
        self.vendor_version_to_cpes
            .get(&(vendor.to_string(), version.to_string()))
            .into_iter()
            .flatten()
    }

    /// Number of distinct records admitted into the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexed_records
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexed_records == 0
    }
}
