//! NVD JSON feed ingestion.
//!
//! Two feeds are consumed: the 1.1 CVE feed (`CVE_Items`) and the CPE match
//! feed (`matches`) that maps complex identifier keys to their constituent
//! simple identifiers. Both are parsed from JSON strings; fetching and
//! unpacking the archives is the caller's concern.

use crate::error::Result;
use crate::model::{BoundKind, Cpe, CpeCache, CpeConfiguration, Cve, CvssMetrics, VersionBound};
use crate::vulns::{CompoundMapping, CveCorpus};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::info;

// ============================================================================
// CVE feed (NVD 1.1)
// ============================================================================

#[derive(Debug, Deserialize)]
struct NvdCveFeed {
    #[serde(rename = "CVE_Items")]
    cve_items: Vec<NvdCveItem>,
}

#[derive(Debug, Deserialize)]
struct NvdCveItem {
    cve: NvdCveBody,
    #[serde(default)]
    configurations: NvdConfigurations,
    #[serde(default)]
    impact: NvdImpact,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NvdCveBody {
    #[serde(rename = "CVE_data_meta")]
    meta: NvdCveMeta,
    #[serde(default)]
    problemtype: NvdProblemType,
}

#[derive(Debug, Deserialize)]
struct NvdCveMeta {
    #[serde(rename = "ID")]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct NvdProblemType {
    #[serde(default)]
    problemtype_data: Vec<NvdProblemTypeData>,
}

#[derive(Debug, Deserialize)]
struct NvdProblemTypeData {
    #[serde(default)]
    description: Vec<NvdLangValue>,
}

#[derive(Debug, Deserialize)]
struct NvdLangValue {
    lang: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct NvdConfigurations {
    #[serde(default)]
    nodes: Vec<NvdNode>,
}

#[derive(Debug, Default, Deserialize)]
struct NvdNode {
    operator: Option<String>,
    #[serde(default)]
    children: Vec<NvdNode>,
    #[serde(default)]
    cpe_match: Vec<NvdCpeMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdCpeMatch {
    #[serde(default)]
    vulnerable: bool,
    cpe23_uri: String,
    version_start_including: Option<String>,
    version_start_excluding: Option<String>,
    version_end_including: Option<String>,
    version_end_excluding: Option<String>,
}

impl NvdCpeMatch {
    fn start_bound(&self) -> Option<VersionBound> {
        version_bound(&self.version_start_including, &self.version_start_excluding)
    }

    fn end_bound(&self) -> Option<VersionBound> {
        version_bound(&self.version_end_including, &self.version_end_excluding)
    }
}

fn version_bound(including: &Option<String>, excluding: &Option<String>) -> Option<VersionBound> {
    // The including form takes precedence when a feed entry carries both
    if let Some(value) = including {
        return Some(VersionBound {
            kind: BoundKind::Including,
            value: value.clone(),
        });
    }
    excluding.as_ref().map(|value| VersionBound {
        kind: BoundKind::Excluding,
        value: value.clone(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct NvdImpact {
    #[serde(rename = "baseMetricV3")]
    base_metric_v3: Option<NvdBaseMetricV3>,
    #[serde(rename = "baseMetricV2")]
    base_metric_v2: Option<NvdBaseMetricV2>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdBaseMetricV3 {
    cvss_v3: NvdCvssV3,
    exploitability_score: Option<f64>,
    impact_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdCvssV3 {
    base_score: Option<f64>,
    base_severity: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdBaseMetricV2 {
    cvss_v2: NvdCvssV2,
    severity: Option<String>,
    exploitability_score: Option<f64>,
    impact_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdCvssV2 {
    base_score: Option<f64>,
}

/// Build a [`CveCorpus`] from one NVD 1.1 CVE feed file.
///
/// Every identifier key in the feed is parsed through `cache`; a malformed
/// key anywhere in the feed fails the whole parse rather than being admitted
/// silently.
pub fn corpus_from_nvd_json(json: &str, cache: &mut CpeCache) -> Result<CveCorpus> {
    let feed: NvdCveFeed = serde_json::from_str(json)?;
    let mut corpus = CveCorpus::new();

    for item in &feed.cve_items {
        corpus.insert(cve_from_item(item, cache)?);
    }

    info!(cves = corpus.len(), "parsed NVD CVE feed");
    Ok(corpus)
}

fn cve_from_item(item: &NvdCveItem, cache: &mut CpeCache) -> Result<Cve> {
    let mut direct = Vec::new();
    let mut configurations = Vec::new();
    for node in &item.configurations.nodes {
        collect_node(node, cache, &mut direct, &mut configurations)?;
    }

    let cwe_ids: BTreeSet<String> = item
        .cve
        .problemtype
        .problemtype_data
        .iter()
        .flat_map(|data| &data.description)
        .filter(|entry| entry.lang == "en" && !entry.value.is_empty())
        .map(|entry| entry.value.clone())
        .collect();

    Ok(Cve::new(
        item.cve.meta.id.clone(),
        direct,
        configurations,
        metrics_from_impact(&item.impact),
        item.published_date.as_deref().and_then(parse_timestamp),
        cwe_ids,
    ))
}

/// Flatten one configuration node.
///
/// Plain (OR) nodes contribute their vulnerable matches as direct
/// identifiers. AND nodes encode the compound rule: vulnerable matches in
/// the subtree are the components, non-vulnerable ones the platforms, one
/// configuration per platform. An AND node without any platform degrades to
/// direct identifiers.
fn collect_node(
    node: &NvdNode,
    cache: &mut CpeCache,
    direct: &mut Vec<Cpe>,
    configurations: &mut Vec<CpeConfiguration>,
) -> Result<()> {
    if node.operator.as_deref() == Some("AND") && !node.children.is_empty() {
        let mut components = Vec::new();
        let mut platforms = Vec::new();
        for child in &node.children {
            for entry in &child.cpe_match {
                let cpe = intern_match(entry, cache)?;
                if entry.vulnerable {
                    components.push(cpe);
                } else {
                    platforms.push(cpe);
                }
            }
        }
        if platforms.is_empty() {
            direct.append(&mut components);
        } else {
            for platform in platforms {
                configurations.push(CpeConfiguration::new(platform, components.clone()));
            }
        }
        return Ok(());
    }

    for entry in node.cpe_match.iter().filter(|entry| entry.vulnerable) {
        direct.push(intern_match(entry, cache)?);
    }
    for child in &node.children {
        collect_node(child, cache, direct, configurations)?;
    }
    Ok(())
}

fn intern_match(entry: &NvdCpeMatch, cache: &mut CpeCache) -> Result<Cpe> {
    let interned =
        cache.intern_with_bounds(&entry.cpe23_uri, entry.start_bound(), entry.end_bound())?;
    Ok((*interned).clone())
}

fn metrics_from_impact(impact: &NvdImpact) -> CvssMetrics {
    if let Some(v3) = &impact.base_metric_v3 {
        return CvssMetrics {
            base_score: v3.cvss_v3.base_score,
            severity: v3.cvss_v3.base_severity.clone(),
            exploitability_score: v3.exploitability_score,
            impact_score: v3.impact_score,
        };
    }
    if let Some(v2) = &impact.base_metric_v2 {
        return CvssMetrics {
            base_score: v2.cvss_v2.base_score,
            severity: v2.severity.clone(),
            exploitability_score: v2.exploitability_score,
            impact_score: v2.impact_score,
        };
    }
    CvssMetrics::default()
}

/// NVD publication timestamps come in minute precision ("2021-05-26T04:15Z")
/// or full RFC 3339. An unparseable timestamp is treated as absent.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

// ============================================================================
// CPE match feed
// ============================================================================

#[derive(Debug, Deserialize)]
struct NvdMatchFeed {
    matches: Vec<NvdMatchEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdMatchEntry {
    cpe23_uri: String,
    version_start_including: Option<String>,
    version_start_excluding: Option<String>,
    version_end_including: Option<String>,
    version_end_excluding: Option<String>,
    // The match feed spells this one key in snake case
    #[serde(default, rename = "cpe_name")]
    cpe_name: Vec<NvdMatchName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdMatchName {
    cpe23_uri: String,
}

/// Build a [`CompoundMapping`] from the NVD CPE match feed.
///
/// A key with an empty constituent list maps to itself.
pub fn compound_mapping_from_json(json: &str, cache: &mut CpeCache) -> Result<CompoundMapping> {
    let feed: NvdMatchFeed = serde_json::from_str(json)?;
    let mut mapping = CompoundMapping::with_capacity(feed.matches.len());

    for entry in &feed.matches {
        let key = cache.intern_with_bounds(
            &entry.cpe23_uri,
            version_bound(
                &entry.version_start_including,
                &entry.version_start_excluding,
            ),
            version_bound(&entry.version_end_including, &entry.version_end_excluding),
        )?;
        let constituents = entry
            .cpe_name
            .iter()
            .map(|name| cache.intern(&name.cpe23_uri))
            .collect::<Result<Vec<_>>>()?;

        let values = if constituents.is_empty() {
            vec![key.clone()]
        } else {
            constituents
        };
        mapping.insert(key.uri.clone(), values);
    }

    info!(entries = mapping.len(), "parsed NVD CPE match feed");
    Ok(mapping)
}
