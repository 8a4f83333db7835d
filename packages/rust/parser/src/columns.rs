//! Header → canonical column resolution.
//!
//! Headers are matched case-insensitively after trimming and collapsing
//! internal whitespace, against a fixed alias table per level.

use taxonomy_shared::{Result, TaxonomyError};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One of the four canonical taxonomy columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Level1,
    Level2,
    Level3,
    Level4,
}

impl Column {
    /// All columns in resolution order.
    pub const ALL: [Column; 4] = [Self::Level1, Self::Level2, Self::Level3, Self::Level4];

    /// Canonical key, e.g. `level_1`.
    pub fn canonical(self) -> &'static str {
        match self {
            Self::Level1 => "level_1",
            Self::Level2 => "level_2",
            Self::Level3 => "level_3",
            Self::Level4 => "level_4",
        }
    }

    /// Accepted header aliases (already normalized).
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Level1 => &["level 1", "l1", "domain", "category", "level1", "lv1"],
            Self::Level2 => &["level 2", "l2", "subdomain", "subcategory", "level2", "lv2"],
            Self::Level3 => &["level 3", "l3", "topic", "area", "level3", "lv3"],
            Self::Level4 => &["level 4", "l4", "term", "item", "terms", "level4", "lv4"],
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Whether a normalized header names this column.
    fn matches(self, normalized: &str) -> bool {
        let canonical = self.canonical();
        normalized == canonical
            || normalized == canonical.replace('_', " ")
            || self.aliases().contains(&normalized)
    }
}

/// A header that resolved to a canonical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// The header text exactly as it appeared in the file.
    pub header: String,
    /// Zero-based field position.
    pub index: usize,
}

/// Canonical column → the header (and position) that supplies it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<ResolvedColumn>; 4],
}

impl ColumnMap {
    pub fn get(&self, column: Column) -> Option<&ResolvedColumn> {
        self.columns[column.index()].as_ref()
    }

    /// Field position for `column`, if the file has it.
    pub fn position(&self, column: Column) -> Option<usize> {
        self.get(column).map(|c| c.index)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Lowercase, trim, and collapse internal whitespace.
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve one raw header to its canonical column. First matching column wins.
pub fn resolve_column(header: &str) -> Option<Column> {
    let normalized = normalize_header(header);
    Column::ALL.into_iter().find(|c| c.matches(&normalized))
}

/// Map the file's headers to canonical columns.
///
/// When several headers resolve to the same column the last one wins.
/// Fails with [`TaxonomyError::MissingColumn`] if nothing resolves to
/// `level_4`; levels 1–3 are optional.
pub fn detect_columns(file: &str, headers: &[String]) -> Result<ColumnMap> {
    let mut map = ColumnMap::default();

    for (index, header) in headers.iter().enumerate() {
        if let Some(column) = resolve_column(header) {
            map.columns[column.index()] = Some(ResolvedColumn {
                header: header.clone(),
                index,
            });
        }
    }

    if map.get(Column::Level4).is_none() {
        return Err(TaxonomyError::MissingColumn {
            file: file.to_string(),
            headers: headers.to_vec(),
            accepted: Column::Level4
                .aliases()
                .iter()
                .map(|a| a.to_string())
                .collect(),
        });
    }

    Ok(map)
}
