//! Vulnerability cross-referencing.
//!
//! [`CveCorpus`] owns the loaded vulnerability records; [`CveLookup`] is the
//! frozen index derived from one corpus snapshot that resolves sets of
//! matched identifier URIs to the vulnerabilities applying to them, both
//! exactly and through compound platform+component configurations.

mod corpus;
mod lookup;

pub use corpus::CveCorpus;
pub use lookup::{CompoundMapping, CveLookup};
