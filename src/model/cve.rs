//! CVE vulnerability records.

use crate::model::Cpe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// CVSS severity metrics attached to a vulnerability record.
///
/// All fields are optional; older feed entries carry only a subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvssMetrics {
    pub base_score: Option<f64>,
    pub severity: Option<String>,
    pub exploitability_score: Option<f64>,
    pub impact_score: Option<f64>,
}

impl CvssMetrics {
    pub fn new(
        base_score: f64,
        severity: impl Into<String>,
        exploitability_score: f64,
        impact_score: f64,
    ) -> Self {
        Self {
            base_score: Some(base_score),
            severity: Some(severity.into()),
            exploitability_score: Some(exploitability_score),
            impact_score: Some(impact_score),
        }
    }
}

/// A compound applicability rule: platform AND at least one component.
///
/// Encodes the "running on" relationship from AND-type feed configurations,
/// e.g. a WebSphere vulnerability that only applies when running on z/OS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpeConfiguration {
    pub platform: Cpe,
    pub components: Vec<Cpe>,
}

impl CpeConfiguration {
    pub fn new(platform: Cpe, components: Vec<Cpe>) -> Self {
        Self {
            platform,
            components,
        }
    }

    /// True iff the platform URI is present AND at least one component URI is.
    #[must_use]
    pub fn matches(&self, uris: &HashSet<String>) -> bool {
        uris.contains(&self.platform.uri)
            && self.components.iter().any(|c| uris.contains(&c.uri))
    }
}

/// A single vulnerability record.
///
/// `vulnerable_cpes` holds directly associated identifiers;
/// `vulnerable_cpe_configurations` holds compound platform+component rules.
/// Records are only mutated during corpus pruning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cve {
    pub cve_id: String,
    pub vulnerable_cpes: Vec<Cpe>,
    pub vulnerable_cpe_configurations: Vec<CpeConfiguration>,
    pub metrics: CvssMetrics,
    pub published: Option<DateTime<Utc>>,
    pub cwe_ids: BTreeSet<String>,
}

impl Cve {
    pub fn new(
        cve_id: impl Into<String>,
        vulnerable_cpes: Vec<Cpe>,
        vulnerable_cpe_configurations: Vec<CpeConfiguration>,
        metrics: CvssMetrics,
        published: Option<DateTime<Utc>>,
        cwe_ids: BTreeSet<String>,
    ) -> Self {
        Self {
            cve_id: cve_id.into(),
            vulnerable_cpes,
            vulnerable_cpe_configurations,
            metrics,
            published,
            cwe_ids,
        }
    }
}
