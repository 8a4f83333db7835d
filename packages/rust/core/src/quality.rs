//! Per-term data quality checks.

use std::sync::LazyLock;

use regex::Regex;

/// Terms with `" and "` are only flagged above this many characters.
const LONG_TERM_CHARS: usize = 50;

pub const SLASH_MESSAGE: &str = r#"contains "/" - consider splitting?"#;
pub const OR_MESSAGE: &str = r#"contains " or " - consider splitting?"#;
pub const LONG_AND_MESSAGE: &str = r#"long term with " and " - consider splitting?"#;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)http").expect("valid regex"));
static OR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i) or ").expect("valid regex"));
static AND_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i) and ").expect("valid regex"));

/// Patterns suggesting `term` holds several terms that were not split.
///
/// Returns one message per matching pattern, in a fixed order. Slashes
/// inside anything that looks like a URL are ignored.
pub fn check_suspicious_splits(term: &str) -> Vec<&'static str> {
    let mut found = Vec::new();

    if term.contains('/') && !URL_RE.is_match(term) {
        found.push(SLASH_MESSAGE);
    }
    if OR_RE.is_match(term) {
        found.push(OR_MESSAGE);
    }
    if AND_RE.is_match(term) && term.chars().count() > LONG_TERM_CHARS {
        found.push(LONG_AND_MESSAGE);
    }

    found
}
