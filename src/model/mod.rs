//! Data model for identifier and vulnerability records.
//!
//! [`Cpe`] is the parsed identifier record, [`Cve`] the vulnerability record,
//! and [`CpeConfiguration`] the compound platform+component applicability
//! rule. [`CpeCache`] memoizes URI parsing for the feed ingestion paths.

mod cpe;
mod cve;

pub use cpe::*;
pub use cve::*;
