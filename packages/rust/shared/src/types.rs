//! Core domain types for taxonomy imports.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TaxonomyRow
// ---------------------------------------------------------------------------

/// One parsed CSV record, with its provenance.
///
/// Level fields are stored exactly as read (untrimmed). Absent cells are
/// empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyRow {
    pub level1: String,
    pub level2: String,
    pub level3: String,
    /// The compound Level-4 field, before splitting.
    pub level4_raw: String,
    /// File name (not full path) the row came from.
    pub source_file: String,
    /// 1-based record number; the header is row 1.
    pub row_index: u64,
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Deterministic identifier of a taxon path (`L1 > L2 > L3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonId(pub Uuid);

/// Deterministic identifier of a term within its taxon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermId(pub Uuid);

impl std::fmt::Display for TaxonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// NormalizedTerm
// ---------------------------------------------------------------------------

/// A (taxon, term) pair that survived row-level deduplication.
///
/// Field order is the column order of `terms_normalized.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTerm {
    /// `"{level1} > {level2} > {level3}"` built from the trimmed levels.
    pub taxon_path: String,
    pub level1: String,
    pub level2: String,
    pub level3: String,
    /// First raw substring (after splitting) that normalized to `term_norm`.
    pub term_raw: String,
    pub term_norm: String,
    pub term_id: TermId,
    pub taxon_id: TaxonId,
    pub source_file: String,
    pub row_index: u64,
}

impl NormalizedTerm {
    /// Column names of the normalized terms CSV, in serialization order.
    pub const FIELDS: [&'static str; 10] = [
        "taxon_path",
        "level1",
        "level2",
        "level3",
        "term_raw",
        "term_norm",
        "term_id",
        "taxon_id",
        "source_file",
        "row_index",
    ];
}

// ---------------------------------------------------------------------------
// Data quality
// ---------------------------------------------------------------------------

/// Kind of data quality finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Level 1, 2 or 3 is empty after trimming.
    MissingLevel,
    /// Level 4 produced no terms after splitting.
    EmptyTerm,
    /// A normalized term looks like it should have been split further.
    SuspiciousSplit,
}

impl IssueCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingLevel => "missing_level",
            Self::EmptyTerm => "empty_term",
            Self::SuspiciousSplit => "suspicious_split",
        }
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single data quality finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqIssue {
    pub category: IssueCategory,
    pub row_index: u64,
    pub source_file: String,
    pub description: String,
}

/// Statistics accumulated over one import run.
///
/// Owned by the run that fills it; read-only once the run returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqStats {
    pub files_processed: usize,
    pub total_rows: usize,
    pub unique_terms: usize,
    pub level1_values: BTreeSet<String>,
    pub level2_values: BTreeSet<String>,
    pub level3_values: BTreeSet<String>,
    /// Unique normalized terms.
    pub level4_values: BTreeSet<String>,
    /// Normalized term → number of rows it appeared in, across the whole run.
    pub term_counts: BTreeMap<String, usize>,
    pub issues: Vec<DqIssue>,
}

impl DqStats {
    /// Record a data quality issue.
    pub fn add_issue(
        &mut self,
        category: IssueCategory,
        row_index: u64,
        source_file: &str,
        description: impl Into<String>,
    ) {
        self.issues.push(DqIssue {
            category,
            row_index,
            source_file: source_file.to_string(),
            description: description.into(),
        });
    }

    /// All issues of one category, in insertion order.
    pub fn issues_by_category(&self, category: IssueCategory) -> Vec<&DqIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.category == category)
            .collect()
    }

    /// Terms counted more than once across the run, in term order.
    pub fn duplicate_terms(&self) -> Vec<(&str, usize)> {
        self.term_counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(term, count)| (term.as_str(), *count))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TaxonomyTree
// ---------------------------------------------------------------------------

/// Level 3 → term list.
pub type SubcategoryMap = BTreeMap<String, Vec<String>>;
/// Level 2 → level 3 map.
pub type CategoryMap = BTreeMap<String, SubcategoryMap>;

/// Hierarchical view: level 1 → level 2 → level 3 → sorted unique terms.
///
/// Map keys are ordered by codepoint (`BTreeMap` over UTF-8 strings). Term
/// lists are sorted by whoever builds the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonomyTree(pub BTreeMap<String, CategoryMap>);

impl TaxonomyTree {
    /// Term list at `l1 / l2 / l3`, if that path exists.
    pub fn terms(&self, l1: &str, l2: &str, l3: &str) -> Option<&[String]> {
        self.0
            .get(l1)?
            .get(l2)?
            .get(l3)
            .map(Vec::as_slice)
    }

    /// Iterate over every `(l1, l2, l3, terms)` leaf in order.
    pub fn leaves(&self) -> impl Iterator<Item = (&str, &str, &str, &[String])> {
        self.0.iter().flat_map(|(l1, categories)| {
            categories.iter().flat_map(move |(l2, subcategories)| {
                subcategories
                    .iter()
                    .map(move |(l3, terms)| (l1.as_str(), l2.as_str(), l3.as_str(), terms.as_slice()))
            })
        })
    }
}
