//! Feed ingestion for the identifier and vulnerability corpora.

mod nvd;

pub use nvd::{compound_mapping_from_json, corpus_from_nvd_json};
