//! Case-insensitive typo correction table.

use std::collections::HashMap;
use std::sync::LazyLock;

use taxonomy_shared::TyposConfig;
use tracing::debug;

/// Built-in corrections: lowercase typo → corrected form.
const BUILTIN_CORRECTIONS: &[(&str, &str)] = &[
    // AI/ML
    ("artifical intelligence", "Artificial Intelligence"),
    ("artifical inteligence", "Artificial Intelligence"),
    ("machine learing", "Machine Learning"),
    ("machien learning", "Machine Learning"),
    ("deep learing", "Deep Learning"),
    ("nueral networks", "Neural Networks"),
    ("neural netwoks", "Neural Networks"),
    // Data
    ("postgre sql", "PostgreSQL"),
    ("postgresql", "PostgreSQL"),
    ("mongo db", "MongoDB"),
    ("mongod b", "MongoDB"),
];

static BUILTIN: LazyLock<TypoMap> = LazyLock::new(TypoMap::builtin);

/// Lookup table applied to already-trimmed terms.
///
/// Keys are stored lowercased; a hit returns the stored correction verbatim,
/// a miss returns the input unchanged (case preserved).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypoMap {
    corrections: HashMap<String, String>,
}

impl TypoMap {
    /// An empty table (no corrections).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in correction table.
    pub fn builtin() -> Self {
        let mut map = Self::empty();
        for (typo, correction) in BUILTIN_CORRECTIONS {
            map.insert(typo, correction);
        }
        map
    }

    /// Shared instance of the built-in table.
    pub fn shared_builtin() -> &'static TypoMap {
        &BUILTIN
    }

    /// Build the table described by the `[typos]` config section.
    pub fn from_config(config: &TyposConfig) -> Self {
        let mut map = if config.builtin {
            Self::builtin()
        } else {
            Self::empty()
        };
        for (typo, correction) in &config.extra {
            map.insert(typo, correction);
        }
        debug!(
            builtin = config.builtin,
            extra = config.extra.len(),
            entries = map.len(),
            "typo table ready"
        );
        map
    }

    /// Add or replace a correction. The typo key is lowercased.
    pub fn insert(&mut self, typo: &str, correction: &str) {
        self.corrections
            .insert(typo.to_lowercase(), correction.to_string());
    }

    /// Return the correction for `value`, or `value` itself.
    pub fn correct(&self, value: &str) -> String {
        self.corrections
            .get(&value.to_lowercase())
            .cloned()
            .unwrap_or_else(|| value.to_string())
    }

    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }
}
