//! Error types for the taxonomy importer.
//!
//! Library crates use [`TaxonomyError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Only input-shape problems are errors. Row-level anomalies (missing levels,
//! empty terms, suspicious splits, duplicates) are recorded as
//! [`DqIssue`](crate::DqIssue)s and never abort a run.

use std::path::PathBuf;

/// Top-level error type for all importer operations.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    /// No header resolved to the required `level_4` column.
    #[error(
        "missing required column 'level_4' in {file}. Found headers: {headers:?}. \
         Accepted aliases: {accepted:?}"
    )]
    MissingColumn {
        file: String,
        headers: Vec<String>,
        accepted: Vec<String>,
    },

    /// The CSV source has no header line at all.
    #[error("empty CSV file: {file}")]
    EmptyFile { file: String },

    /// The input directory (or buffer set) holds zero CSV files.
    #[error("no CSV files found in {dir:?}")]
    NoInputFiles { dir: PathBuf },

    /// The run finished without extracting a single term.
    #[error("no terms extracted from input files")]
    NoTerms,

    /// Malformed CSV record or invalid UTF-8.
    #[error("CSV error in {file}: {message}")]
    Csv { file: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Rendering an artifact (CSV, JSON, YAML) failed.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TaxonomyError>;

impl TaxonomyError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a serialization error from any displayable message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Create a CSV error for the named source.
    pub fn csv(file: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Csv {
            file: file.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
