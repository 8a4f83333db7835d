//! Import orchestration and domain logic for the taxonomy importer.
//!
//! This crate ties together parsing, normalization, aggregation, tree
//! building and artifact rendering into end-to-end runs (`run_import`,
//! `import_buffers`).

pub mod aggregate;
pub mod pipeline;
pub mod quality;
pub mod tree;

pub use aggregate::{Aggregator, process_taxonomy};
pub use pipeline::{
    ImportConfig, ImportOptions, ImportResult, ProgressReporter, SilentProgress, import_buffers,
    run_import,
};
pub use quality::check_suspicious_splits;
pub use tree::build_taxonomy_tree;
