//! Matcher configuration.

use crate::error::{CpeMatchError, Result};
use crate::matching::versions::VersionStrategy;
use serde::{Deserialize, Serialize};

/// Configuration for product-to-identifier matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Minimum similarity score (0–100) for the relaxed pass and for
    /// non-relaxing calls; the version-strict first pass always filters
    /// at 100.
    pub match_threshold: f64,
    /// Maximum number of identifier URIs returned per query
    pub n_max_matches: usize,
    /// Vendor/version pairing algorithm
    #[serde(default)]
    pub version_strategy: VersionStrategy,
    /// Whether a zero-match strict pass triggers the single wildcard-version
    /// retry
    #[serde(default = "default_true")]
    pub relax_version: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            match_threshold: 80.0,
            n_max_matches: 10,
            version_strategy: VersionStrategy::default(),
            relax_version: true,
        }
    }
}

impl MatchConfig {
    /// Stricter matching: higher relaxed-pass bar, no wildcard retry.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            match_threshold: 95.0,
            relax_version: false,
            ..Self::default()
        }
    }

    /// Permissive matching for exploratory runs.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            match_threshold: 70.0,
            ..Self::default()
        }
    }

    /// Validate field ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.match_threshold) {
            return Err(CpeMatchError::config(format!(
                "match_threshold must be within 0-100, got {}",
                self.match_threshold
            )));
        }
        if self.n_max_matches == 0 {
            return Err(CpeMatchError::config("n_max_matches must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.match_threshold, 80.0);
        assert_eq!(config.n_max_matches, 10);
        assert_eq!(config.version_strategy, VersionStrategy::PrefixHeuristic);
        assert!(config.relax_version);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let config = MatchConfig {
            match_threshold: 120.0,
            ..MatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let config = MatchConfig {
            n_max_matches: 0,
            ..MatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_defaults_for_new_fields() {
        let config: MatchConfig =
            serde_json::from_str(r#"{"match_threshold": 85.0, "n_max_matches": 5}"#)
                .expect("partial config deserializes");
        assert_eq!(config.version_strategy, VersionStrategy::PrefixHeuristic);
        assert!(config.relax_version);
    }
}
