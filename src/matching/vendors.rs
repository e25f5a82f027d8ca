//! Vendor resolution against the canonical vendor keys of the index.
//!
//! Certificate vendor strings are free text: multi-vendor lists
//! ("Thales/Gemalto"), corporate suffixes ("Hewlett-Packard Company"),
//! leading articles. [`VendorResolver`] maps them onto the canonical keys
//! the identifier index is bucketed by, with a declarative
//! [`VendorAliasTable`] for the cases plain tokenization cannot reach.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single alias rule: a trigger predicate plus the canonical keys it adds.
///
/// The rule fires when any of its configured triggers hit; triggers left
/// empty are ignored. Added keys are additive and unconditional; they do
/// not need to be present in the vendor key set themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasRule {
    /// Fires when the whole input equals this string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whole: Option<String>,
    /// Fires when any of these appears as a whitespace token
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens_any: Vec<String>,
    /// Fires when all of these appear as whitespace tokens
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens_all: Vec<String>,
    /// Canonical keys to add when the rule fires
    pub adds: Vec<String>,
}

impl AliasRule {
    fn fires(&self, input: &str, tokens: &[&str]) -> bool {
        if self.whole.as_deref() == Some(input) {
            return true;
        }
        if !self.tokens_any.is_empty()
            && self.tokens_any.iter().any(|t| tokens.contains(&t.as_str()))
        {
            return true;
        }
        !self.tokens_all.is_empty()
            && self.tokens_all.iter().all(|t| tokens.contains(&t.as_str()))
    }
}

/// Declarative table of hand-curated vendor alias rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorAliasTable {
    rules: Vec<AliasRule>,
}

impl VendorAliasTable {
    /// Create an empty alias table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an alias table with the built-in curated rules
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.load_builtins();
        table
    }

    fn load_builtins(&mut self) {
        self.add_rule(AliasRule {
            whole: Some("hewlett packard".to_string()),
            tokens_any: vec!["hewlett".to_string(), "hewlett-packard".to_string()],
            adds: vec!["hp".to_string()],
            ..AliasRule::default()
        });
        self.add_rule(AliasRule {
            tokens_any: vec!["thales".to_string()],
            adds: vec!["thalesesecurity".to_string(), "thalesgroup".to_string()],
            ..AliasRule::default()
        });
        self.add_rule(AliasRule {
            tokens_any: vec!["stmicroelectronics".to_string()],
            adds: vec!["st".to_string()],
            ..AliasRule::default()
        });
        self.add_rule(AliasRule {
            tokens_all: vec!["athena".to_string(), "smartcard".to_string()],
            adds: vec!["athena-scs".to_string()],
            ..AliasRule::default()
        });
    }

    /// Append a rule to the table
    pub fn add_rule(&mut self, rule: AliasRule) {
        self.rules.push(rule);
    }

    /// Load additional rules from JSON
    pub fn load_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let rules: Vec<AliasRule> = serde_json::from_str(json)?;
        self.rules.extend(rules);
        Ok(())
    }

    /// Export all rules to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rules)
    }

    /// Canonical keys added by every rule that fires on this input
    pub fn additional_keys<'a>(
        &'a self,
        input: &'a str,
        tokens: &'a [&'a str],
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.fires(input, tokens))
            .flat_map(|rule| rule.adds.iter().map(String::as_str))
    }
}

/// Resolves raw vendor strings to canonical vendor keys.
///
/// Borrows the key set of a built index; the alias table is evaluated
/// additively on top of the exact/token lookups.
pub struct VendorResolver<'a> {
    vendors: &'a IndexSet<String>,
    aliases: &'a VendorAliasTable,
}

impl<'a> VendorResolver<'a> {
    pub fn new(vendors: &'a IndexSet<String>, aliases: &'a VendorAliasTable) -> Self {
        Self { vendors, aliases }
    }

    /// Resolve a raw vendor string to the set of matching canonical keys.
    ///
    /// Returns `None` when nothing resolves; that is a "no match", not an
    /// error. Separator splitting (`,` and `/`) takes priority over every
    /// other rule: a multi-vendor string is never treated as a single name.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Option<BTreeSet<String>> {
        self.resolve_normalized(raw.trim().to_lowercase().as_str())
    }

    fn resolve_normalized(&self, input: &str) -> Option<BTreeSet<String>> {
        if input.is_empty() {
            return None;
        }

        if input.contains([',', '/']) {
            let mut union = BTreeSet::new();
            for part in input.split([',', '/']) {
                if let Some(resolved) = self.resolve_normalized(part.trim()) {
                    union.extend(resolved);
                }
            }
            return (!union.is_empty()).then_some(union);
        }

        let mut result = BTreeSet::new();
        if self.vendors.contains(input) {
            result.insert(input.to_string());
        }

        let tokens: Vec<&str> = input.split_whitespace().collect();
        if let Some(first) = tokens.first() {
            if self.vendors.contains(*first) {
                result.insert((*first).to_string());
            }
            if tokens.len() > 1 {
                let concatenated = format!("{}{}", tokens[0], tokens[1]);
                if self.vendors.contains(concatenated.as_str()) {
                    result.insert(concatenated);
                }
            }
        }

        result.extend(
            self.aliases
                .additional_keys(input, &tokens)
                .map(ToString::to_string),
        );

        if result.is_empty() {
            // Leading article: retry on the remainder
            if let Some(("the", rest)) = tokens.split_first().map(|(f, r)| (*f, r)) {
                if !rest.is_empty() {
                    return self.resolve_normalized(&rest.join(" "));
                }
            }
            return None;
        }
        Some(result)
    }
}
