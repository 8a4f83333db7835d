//! Taxonomy tree builder.
//!
//! Folds normalized terms into the level 1 → level 2 → level 3 → terms
//! hierarchy that backs `taxonomy_tree.json` and `taxonomy_tree.yaml`.

use tracing::{debug, instrument};

use taxonomy_shared::{NormalizedTerm, TaxonomyTree};

/// Build the sorted tree from `terms`.
///
/// Levels come from each term's level fields. Each term list holds every
/// distinct `term_norm` once; map keys and term lists are in codepoint order
/// regardless of the order of `terms`.
#[instrument(skip_all, fields(term_count = terms.len()))]
pub fn build_taxonomy_tree(terms: &[NormalizedTerm]) -> TaxonomyTree {
    let mut tree = TaxonomyTree::default();

    for term in terms {
        let list = tree
            .0
            .entry(term.level1.clone())
            .or_default()
            .entry(term.level2.clone())
            .or_default()
            .entry(term.level3.clone())
            .or_default();

        if !list.contains(&term.term_norm) {
            list.push(term.term_norm.clone());
        }
    }

    sort_terms(&mut tree);

    debug!(leaves = tree.leaves().count(), "taxonomy tree built");

    tree
}

/// Sort every terminal term list. Map keys are already ordered.
fn sort_terms(tree: &mut TaxonomyTree) {
    for categories in tree.0.values_mut() {
        for subcategories in categories.values_mut() {
            for list in subcategories.values_mut() {
                list.sort();
            }
        }
    }
}
