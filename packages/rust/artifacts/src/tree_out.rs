//! Tree artifacts: `taxonomy_tree.json` and `taxonomy_tree.yaml`.

use taxonomy_shared::{Result, TaxonomyError, TaxonomyTree};

/// Pretty JSON, two-space indent, non-ASCII kept literal, trailing newline.
pub fn render_tree_json(tree: &TaxonomyTree) -> Result<String> {
    let mut json = serde_json::to_string_pretty(tree)
        .map_err(|e| TaxonomyError::serialization(format!("JSON serialization failed: {e}")))?;
    json.push('\n');
    Ok(json)
}

/// Block-style YAML with non-ASCII kept literal.
///
/// Terms a YAML 1.1 loader would read as booleans, numbers, dates or null
/// (`No`, `on`, `1:30`, `2024-01-01`, ...) are quoted, so every loader sees
/// the same tree as the JSON artifact.
pub fn render_tree_yaml(tree: &TaxonomyTree) -> String {
    crate::yaml::to_string(&tree.0)
}
