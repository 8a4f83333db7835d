//! Deterministic, content-addressed identifiers.
//!
//! Identifiers are UUIDv5 values under one fixed namespace, so re-importing
//! the same data always yields the same keys.

use taxonomy_shared::{TaxonId, TermId};
use uuid::Uuid;

/// Namespace for every identifier this importer derives. Never regenerate.
pub const NAMESPACE_META: Uuid = Uuid::from_u128(0x6ba7b810_9dad_11d1_80b4_00c04fd430c8);

/// Join three levels into a taxon path (`"L1 > L2 > L3"`).
///
/// The levels are used as given; pass the trimmed values.
pub fn build_taxon_path(level1: &str, level2: &str, level3: &str) -> String {
    format!("{level1} > {level2} > {level3}")
}

/// Identifier of a taxon path.
pub fn generate_taxon_id(taxon_path: &str) -> TaxonId {
    TaxonId(Uuid::new_v5(&NAMESPACE_META, taxon_path.as_bytes()))
}

/// Identifier of a normalized term under its taxon.
pub fn generate_term_id(taxon_id: &TaxonId, term_norm: &str) -> TermId {
    let composite = format!("{taxon_id}|{term_norm}");
    TermId(Uuid::new_v5(&NAMESPACE_META, composite.as_bytes()))
}
