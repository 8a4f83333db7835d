//! Term splitting, normalization, deduplication, and identifier generation.
//!
//! `normalize_term` is `apply_typo_correction(trim(value))`. Every pair
//! emitted by [`dedupe_with_mapping`] satisfies
//! `normalize_term(raw) == normalized` for the table it was built with.

mod ids;
mod splitter;
mod typo;

use std::collections::HashSet;
use std::hash::Hash;

pub use ids::{NAMESPACE_META, build_taxon_path, generate_taxon_id, generate_term_id};
pub use splitter::split_level4;
pub use typo::TypoMap;

/// Strip surrounding whitespace. `None` maps to the empty string.
pub fn trim<'a>(value: impl Into<Option<&'a str>>) -> String {
    value.into().map(str::trim).unwrap_or_default().to_string()
}

/// Apply the built-in typo table to `value`.
pub fn apply_typo_correction(value: &str) -> String {
    TypoMap::shared_builtin().correct(value)
}

/// Trim, then apply the built-in typo table.
pub fn normalize_term(value: &str) -> String {
    TypoMap::shared_builtin().normalize_term(value)
}

impl TypoMap {
    /// Trim, then apply this table.
    pub fn normalize_term(&self, value: &str) -> String {
        self.correct(&trim(value))
    }
}

/// Remove exact duplicates, keeping the first occurrence of each item.
pub fn dedupe<T: Clone + Eq + Hash>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// Dedupe one row's split terms by normalized value.
///
/// Returns `(first_raw, normalized)` pairs in first-seen order. The raw string
/// kept for each normalized value is the one that produced it first, so the
/// pair never mixes a raw string with another raw string's normalization.
pub fn dedupe_with_mapping<S: AsRef<str>>(raw_terms: &[S], typos: &TypoMap) -> Vec<(String, String)> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut pairs = Vec::new();

    for raw in raw_terms {
        let raw = raw.as_ref();
        let norm = typos.normalize_term(raw);
        if seen.insert(norm.clone()) {
            pairs.push((raw.to_string(), norm));
        }
    }

    pairs
}
