//! String normalization for noisy certificate product names.
//!
//! Certificate documents carry trademark glyphs, punctuation and embedded
//! vendor/version fragments that the dictionary titles do not. These pure
//! transforms bring both sides onto common ground before scoring.

use regex::Regex;
use std::sync::LazyLock;

/// Unicode-aware non-word class, the complement of `[\w]`.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W").expect("static regex"));

/// Remove registered/trademark glyphs.
#[must_use]
pub fn strip_trademark_symbols(s: &str) -> String {
    s.replace(['®', '™'], "")
}

/// Replace every Unicode non-word character with a single space.
#[must_use]
pub fn fold_non_alnum_to_space(s: &str) -> String {
    NON_WORD.replace_all(s, " ").into_owned()
}

/// Lowercase, strip trademark glyphs, then fold non-word characters.
///
/// The composition order is fixed: lowercase, strip symbols, fold.
#[must_use]
pub fn fully_sanitize(s: &str) -> String {
    fold_non_alnum_to_space(&strip_trademark_symbols(&s.to_lowercase()))
}

/// Strip known vendor and version fragments out of a product string.
///
/// Each fragment is lowercased and non-word-folded, then its first
/// occurrence is removed as a substring, trimming surrounding whitespace
/// after each removal. Vendors are removed before versions, in input order,
/// each removal operating on the progressively stripped string.
#[must_use]
pub fn strip_vendors_and_versions<V, W>(s: &str, vendors: &[V], versions: &[W]) -> String
where
    V: AsRef<str>,
    W: AsRef<str>,
{
    let mut stripped = s.to_lowercase();
    let fragments = vendors
        .iter()
        .map(AsRef::as_ref)
        .chain(versions.iter().map(AsRef::as_ref));

    for fragment in fragments {
        let needle = fold_non_alnum_to_space(&fragment.to_lowercase());
        if needle.is_empty() {
            continue;
        }
        stripped = stripped.replacen(&needle, "", 1).trim().to_string();
    }
    stripped
}
