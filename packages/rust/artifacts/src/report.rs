//! Markdown data quality report (`dq_report.md`).
//!
//! The layout is fixed: summary, per-level counts, then one section per
//! issue kind. Every listing is sorted so the report is byte-stable for a
//! given input.

use std::collections::HashSet;

use taxonomy_shared::{DqIssue, DqStats, IssueCategory};

/// Maximum number of entries listed per issue section.
pub const MAX_LISTED: usize = 20;

/// Render the report. The result ends with a single newline.
pub fn generate_dq_report(stats: &DqStats) -> String {
    let mut lines: Vec<String> = Vec::new();

    // --- Summary ---
    lines.push("# Data Quality Report".into());
    lines.push(String::new());
    lines.push("## Summary".into());
    lines.push(String::new());
    lines.push(format!("- Files processed: {}", stats.files_processed));
    lines.push(format!("- Total rows: {}", stats.total_rows));
    lines.push(format!("- Unique terms: {}", stats.unique_terms));
    lines.push(String::new());

    // --- Counts by level ---
    lines.push("## Counts by Level".into());
    lines.push(String::new());
    lines.push("| Level | Unique Values |".into());
    lines.push("|-------|---------------|".into());
    let level_sets = [
        &stats.level1_values,
        &stats.level2_values,
        &stats.level3_values,
        &stats.level4_values,
    ];
    for (i, values) in level_sets.iter().enumerate() {
        lines.push(format!("| L{}    | {:>13} |", i + 1, values.len()));
    }
    lines.push(String::new());

    lines.push("## Issues Found".into());
    lines.push(String::new());

    missing_levels_section(stats, &mut lines);
    duplicates_section(stats, &mut lines);
    empty_terms_section(stats, &mut lines);
    suspicious_section(stats, &mut lines);

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn missing_levels_section(stats: &DqStats, lines: &mut Vec<String>) {
    let mut missing = stats.issues_by_category(IssueCategory::MissingLevel);
    if missing.is_empty() {
        none_found("### Missing Levels", lines);
        return;
    }

    let affected_rows: HashSet<(&str, u64)> = missing
        .iter()
        .map(|i| (i.source_file.as_str(), i.row_index))
        .collect();

    lines.push(format!("### Missing Levels ({} rows)", affected_rows.len()));
    lines.push(String::new());
    lines.push("| Level | Count |".into());
    lines.push("|-------|-------|".into());
    for level in 1..=3 {
        let description = format!("Missing L{level}");
        let count = missing.iter().filter(|i| i.description == description).count();
        lines.push(format!("| L{level}    | {count:>5} |"));
    }
    lines.push(String::new());

    missing.sort_by(|a, b| {
        (&a.source_file, a.row_index, &a.description).cmp(&(&b.source_file, b.row_index, &b.description))
    });
    list_issues(&missing, lines);
}

fn duplicates_section(stats: &DqStats, lines: &mut Vec<String>) {
    let mut duplicates = stats.duplicate_terms();
    if duplicates.is_empty() {
        none_found("### Duplicate Terms", lines);
        return;
    }

    duplicates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    lines.push(format!("### Duplicate Terms ({} terms)", duplicates.len()));
    lines.push(String::new());
    for (term, count) in duplicates.iter().take(MAX_LISTED) {
        lines.push(format!("- \"{term}\" appears {count}x"));
    }
    more_line(duplicates.len(), lines);
    lines.push(String::new());
}

fn empty_terms_section(stats: &DqStats, lines: &mut Vec<String>) {
    let mut empty = stats.issues_by_category(IssueCategory::EmptyTerm);
    if empty.is_empty() {
        none_found("### Empty Terms", lines);
        return;
    }

    empty.sort_by(|a, b| (&a.source_file, a.row_index).cmp(&(&b.source_file, b.row_index)));

    lines.push(format!("### Empty Terms ({} rows)", empty.len()));
    lines.push(String::new());
    list_issues(&empty, lines);
}

fn suspicious_section(stats: &DqStats, lines: &mut Vec<String>) {
    let mut suspicious = stats.issues_by_category(IssueCategory::SuspiciousSplit);
    if suspicious.is_empty() {
        none_found("### Suspicious Split Candidates", lines);
        return;
    }

    suspicious.sort_by(|a, b| {
        (&a.source_file, a.row_index, &a.description).cmp(&(&b.source_file, b.row_index, &b.description))
    });

    lines.push(format!("### Suspicious Split Candidates ({} terms)", suspicious.len()));
    lines.push(String::new());
    list_issues(&suspicious, lines);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Up to [`MAX_LISTED`] issue lines, the overflow line, and a blank line.
fn list_issues(issues: &[&DqIssue], lines: &mut Vec<String>) {
    for issue in issues.iter().take(MAX_LISTED) {
        lines.push(format!(
            "- Row {} ({}): {}",
            issue.row_index, issue.source_file, issue.description
        ));
    }
    more_line(issues.len(), lines);
    lines.push(String::new());
}

fn more_line(total: usize, lines: &mut Vec<String>) {
    if total > MAX_LISTED {
        lines.push(format!("- ... and {} more", total - MAX_LISTED));
    }
}

fn none_found(heading: &str, lines: &mut Vec<String>) {
    lines.push(heading.into());
    lines.push(String::new());
    lines.push("None found.".into());
    lines.push(String::new());
}
