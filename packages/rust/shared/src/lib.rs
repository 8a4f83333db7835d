//! Shared types, error model, and configuration for the taxonomy importer.
//!
//! This crate is the foundation depended on by all other importer crates.
//! It provides:
//! - [`TaxonomyError`], the unified error type
//! - Domain types ([`TaxonomyRow`], [`NormalizedTerm`], [`DqStats`], [`TaxonomyTree`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, TyposConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{Result, TaxonomyError};
pub use types::{
    CategoryMap, DqIssue, DqStats, IssueCategory, NormalizedTerm, SubcategoryMap, TaxonId,
    TaxonomyRow, TaxonomyTree, TermId,
};
