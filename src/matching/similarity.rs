//! String similarity metrics for product/identifier scoring.
//!
//! Composes the character-level primitive from `strsim` into the token-set
//! and partial variants the matcher scores with. Scores are on a 0–100
//! scale; 100 means the strings are interchangeable under the metric.

use std::collections::BTreeSet;
use strsim::normalized_levenshtein;

/// Character-level similarity ratio.
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

/// Best ratio of the shorter string against any equal-length window of the
/// longer one.
///
/// Catches product names embedded in longer titles ("enterprise linux"
/// inside "red hat enterprise linux server").
#[must_use]
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let window_len = shorter.chars().count();
    if window_len == 0 {
        return ratio(a, b);
    }

    let longer_chars: Vec<char> = longer.chars().collect();
    if window_len >= longer_chars.len() {
        return ratio(shorter, longer);
    }

    let mut best = 0.0_f64;
    for window in longer_chars.windows(window_len) {
        let candidate: String = window.iter().collect();
        best = best.max(ratio(shorter, &candidate));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Token-set similarity over whitespace-separated tokens.
///
/// Compares the sorted token intersection against each side's full sorted
/// token set and takes the best ratio. A query whose tokens are a subset of
/// the other string's tokens scores 100 regardless of the extra tokens.
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = join(tokens_a.intersection(&tokens_b));
    let diff_a = join(tokens_a.difference(&tokens_b));
    let diff_b = join(tokens_b.difference(&tokens_a));

    let combined_a = concat_sorted(&intersection, &diff_a);
    let combined_b = concat_sorted(&intersection, &diff_b);

    ratio(&intersection, &combined_a)
        .max(ratio(&intersection, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

fn join<'a>(tokens: impl Iterator<Item = &'a &'a str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn concat_sorted(base: &str, rest: &str) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (_, true) => base.to_string(),
        (true, false) => rest.to_string(),
        (false, false) => format!("{base} {rest}"),
    }
}
