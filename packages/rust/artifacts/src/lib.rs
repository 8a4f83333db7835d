//! Artifact rendering and writing for taxonomy imports.
//!
//! Every artifact is rendered to memory first ([`render_all`]); writing is a
//! separate step ([`write_artifacts`]) so callers can inspect or serve the
//! bytes without touching the filesystem.

pub mod csv_out;
pub mod report;
pub mod tree_out;
mod yaml;

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use taxonomy_shared::{DqStats, NormalizedTerm, Result, TaxonomyError, TaxonomyTree};

pub use csv_out::{render_clean_csv, render_terms_normalized};
pub use report::{MAX_LISTED, generate_dq_report};
pub use tree_out::{render_tree_json, render_tree_yaml};

pub const TAXONOMY_CLEAN_CSV: &str = "taxonomy_clean.csv";
pub const TERMS_NORMALIZED_CSV: &str = "terms_normalized.csv";
pub const TAXONOMY_TREE_JSON: &str = "taxonomy_tree.json";
pub const TAXONOMY_TREE_YAML: &str = "taxonomy_tree.yaml";
pub const DQ_REPORT_MD: &str = "dq_report.md";

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: &'static str,
    pub content: Vec<u8>,
}

impl Artifact {
    fn new(filename: &'static str, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename,
            content: content.into(),
        }
    }

    /// Content as text. Every artifact is UTF-8.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Hex SHA-256 of the content.
    pub fn sha256(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.content);
        format!("{:x}", hasher.finalize())
    }
}

/// Metadata for a written artifact file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ArtifactMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Render all five artifacts, in write order.
///
/// `terms` must already be in final sorted order and `tree` built from them.
#[instrument(skip_all, fields(terms = terms.len()))]
pub fn render_all(
    terms: &[NormalizedTerm],
    tree: &TaxonomyTree,
    stats: &DqStats,
) -> Result<Vec<Artifact>> {
    let artifacts = vec![
        Artifact::new(TAXONOMY_CLEAN_CSV, render_clean_csv(terms)?),
        Artifact::new(TERMS_NORMALIZED_CSV, render_terms_normalized(terms)?),
        Artifact::new(TAXONOMY_TREE_JSON, render_tree_json(tree)?),
        Artifact::new(TAXONOMY_TREE_YAML, render_tree_yaml(tree)),
        Artifact::new(DQ_REPORT_MD, generate_dq_report(stats)),
    ];
    debug!(count = artifacts.len(), "artifacts rendered");
    Ok(artifacts)
}

/// Write artifacts into `output_dir`, creating it if needed.
///
/// Each file is written to a hidden temp file next to its target and then
/// renamed over it, so a target is either the old or the new content.
#[instrument(skip_all, fields(output_dir = %output_dir.display(), artifact_count = artifacts.len()))]
pub fn write_artifacts(output_dir: &Path, artifacts: &[Artifact]) -> Result<Vec<ArtifactMeta>> {
    std::fs::create_dir_all(output_dir).map_err(|e| TaxonomyError::io(output_dir, e))?;

    let mut metas = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let target = output_dir.join(artifact.filename);
        let temp = output_dir.join(format!(".{}.tmp", artifact.filename));

        std::fs::write(&temp, &artifact.content).map_err(|e| TaxonomyError::io(&temp, e))?;
        std::fs::rename(&temp, &target).map_err(|e| TaxonomyError::io(&target, e))?;

        let size = artifact.content.len();
        debug!(file = artifact.filename, size, "wrote artifact");

        metas.push(ArtifactMeta {
            filename: artifact.filename.to_string(),
            sha256: artifact.sha256(),
            size_bytes: size,
        });
    }

    info!(count = metas.len(), "artifacts written");

    Ok(metas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("tx-artifacts-test-{}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn render_all_produces_five_named_artifacts() {
        let artifacts = render_all(&[], &TaxonomyTree::default(), &DqStats::default()).unwrap();
        let names: Vec<&str> = artifacts.iter().map(|a| a.filename).collect();
        assert_eq!(
            names,
            [
                TAXONOMY_CLEAN_CSV,
                TERMS_NORMALIZED_CSV,
                TAXONOMY_TREE_JSON,
                TAXONOMY_TREE_YAML,
                DQ_REPORT_MD
            ]
        );
        assert_eq!(artifacts[2].text(), "{}\n");
    }

    #[test]
    fn write_creates_dir_and_reports_checksums() {
        let dir = temp_dir().join("nested");
        let artifacts = vec![
            Artifact::new("a.txt", "hello"),
            Artifact::new("b.txt", ""),
        ];

        let metas = write_artifacts(&dir, &artifacts).unwrap();

        assert_eq!(std::fs::read_to_string(dir.join("a.txt")).unwrap(), "hello");
        assert_eq!(metas[0].size_bytes, 5);
        assert_eq!(
            metas[0].sha256,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(
            metas[1].sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(!dir.join(".a.txt.tmp").exists());

        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[test]
    fn write_replaces_existing_files() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.txt"), "old content that is longer").unwrap();

        write_artifacts(&dir, &[Artifact::new("a.txt", "new")]).unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("a.txt")).unwrap(), "new");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
