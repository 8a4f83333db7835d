//! End-to-end import pipeline: CSV sources → process → render → write.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use taxonomy_artifacts::{Artifact, ArtifactMeta};
use taxonomy_normalize::TypoMap;
use taxonomy_parser::NamedBuffer;
use taxonomy_shared::{DqStats, NormalizedTerm, Result, TaxonomyError, TaxonomyRow, TaxonomyTree};

use crate::aggregate::process_taxonomy;
use crate::tree::build_taxonomy_tree;

/// Rows between two `rows_read` progress callbacks.
const ROW_PROGRESS_INTERVAL: usize = 500;

/// Configuration for [`run_import`].
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Directory scanned for `*.csv` files.
    pub input_dir: PathBuf,
    /// Directory the artifacts are written to (created if missing).
    pub output_dir: PathBuf,
    /// Treat any data quality issue as a failed run.
    pub strict: bool,
    /// Render everything but write nothing.
    pub dry_run: bool,
    /// Typo corrections applied to every term.
    pub typos: TypoMap,
}

/// Options for [`import_buffers`].
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub strict: bool,
    pub typos: TypoMap,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            strict: false,
            typos: TypoMap::builtin(),
        }
    }
}

/// Result of an import run.
#[derive(Debug)]
pub struct ImportResult {
    /// Terms in final sorted order.
    pub terms: Vec<NormalizedTerm>,
    pub stats: DqStats,
    pub tree: TaxonomyTree,
    /// Rendered artifacts, in write order.
    pub artifacts: Vec<Artifact>,
    /// Files actually written. Empty for dry runs and in-memory imports.
    pub written: Vec<ArtifactMeta>,
    /// Whether the run was strict.
    pub strict: bool,
    pub elapsed: Duration,
}

impl ImportResult {
    /// A strict run that recorded at least one issue.
    pub fn strict_violation(&self) -> bool {
        self.strict && !self.stats.issues.is_empty()
    }

    /// Rendered artifact by file name.
    pub fn artifact(&self, filename: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.filename == filename)
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called periodically while rows are read.
    fn rows_read(&self, count: usize);
    /// Called after each artifact file is written.
    fn artifact_written(&self, filename: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &ImportResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn rows_read(&self, _count: usize) {}
    fn artifact_written(&self, _filename: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &ImportResult) {}
}

/// Run the full import over a directory of CSV files.
///
/// 1. Parse every `*.csv` file in `input_dir`, in name order
/// 2. Split, normalize, dedupe and aggregate
/// 3. Fail with [`TaxonomyError::NoTerms`] if nothing was extracted
/// 4. Build the tree and render all artifacts
/// 5. Write artifacts to `output_dir` (skipped for dry runs)
///
/// A strict run with issues still writes its artifacts; check
/// [`ImportResult::strict_violation`].
#[instrument(skip_all, fields(input = %config.input_dir.display(), output = %config.output_dir.display(), strict = config.strict))]
pub fn run_import(config: &ImportConfig, progress: &dyn ProgressReporter) -> Result<ImportResult> {
    let start = Instant::now();

    info!(dry_run = config.dry_run, "starting import");

    // --- Phase 1: Parse + process ---
    progress.phase("Reading taxonomy files");
    let rows = taxonomy_parser::parse_directory(&config.input_dir)?;
    let (terms, stats, tree, artifacts) = process_and_render(rows, &config.typos, progress)?;

    // --- Phase 2: Write ---
    let written = if config.dry_run {
        info!("dry run, skipping artifact writes");
        Vec::new()
    } else {
        progress.phase("Writing artifacts");
        let metas = taxonomy_artifacts::write_artifacts(&config.output_dir, &artifacts)?;
        for (i, meta) in metas.iter().enumerate() {
            progress.artifact_written(&meta.filename, i + 1, metas.len());
        }
        metas
    };

    let result = ImportResult {
        terms,
        stats,
        tree,
        artifacts,
        written,
        strict: config.strict,
        elapsed: start.elapsed(),
    };

    finish(&result, progress);
    Ok(result)
}

/// Run the import over in-memory CSV files and keep the artifacts in memory.
///
/// Buffers behave like files in one directory: only names ending in `.csv`
/// count, read in name order.
#[instrument(skip_all, fields(buffers = buffers.len(), strict = options.strict))]
pub fn import_buffers(
    buffers: Vec<NamedBuffer>,
    options: &ImportOptions,
    progress: &dyn ProgressReporter,
) -> Result<ImportResult> {
    let start = Instant::now();

    progress.phase("Reading uploaded files");
    let rows = taxonomy_parser::parse_buffers(buffers)?;
    let (terms, stats, tree, artifacts) = process_and_render(rows, &options.typos, progress)?;

    let result = ImportResult {
        terms,
        stats,
        tree,
        artifacts,
        written: Vec::new(),
        strict: options.strict,
        elapsed: start.elapsed(),
    };

    finish(&result, progress);
    Ok(result)
}

// ---------------------------------------------------------------------------
// Shared stages
// ---------------------------------------------------------------------------

type Processed = (Vec<NormalizedTerm>, DqStats, TaxonomyTree, Vec<Artifact>);

fn process_and_render<I>(rows: I, typos: &TypoMap, progress: &dyn ProgressReporter) -> Result<Processed>
where
    I: Iterator<Item = Result<TaxonomyRow>>,
{
    let mut count = 0usize;
    let rows = rows.inspect(|row| {
        if row.is_ok() {
            count += 1;
            if count % ROW_PROGRESS_INTERVAL == 0 {
                progress.rows_read(count);
            }
        }
    });

    let (terms, stats) = process_taxonomy(rows, typos)?;

    if terms.is_empty() {
        warn!(rows = stats.total_rows, "no terms extracted");
        return Err(TaxonomyError::NoTerms);
    }

    progress.phase("Building taxonomy tree");
    let tree = build_taxonomy_tree(&terms);

    progress.phase("Rendering artifacts");
    let artifacts = taxonomy_artifacts::render_all(&terms, &tree, &stats)?;

    Ok((terms, stats, tree, artifacts))
}

fn finish(result: &ImportResult, progress: &dyn ProgressReporter) {
    progress.done(result);

    if result.strict_violation() {
        warn!(issues = result.stats.issues.len(), "strict mode: data quality issues found");
    }

    info!(
        files = result.stats.files_processed,
        rows = result.stats.total_rows,
        unique_terms = result.stats.unique_terms,
        issues = result.stats.issues.len(),
        written = result.written.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "import complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use taxonomy_artifacts::{DQ_REPORT_MD, TAXONOMY_CLEAN_CSV};

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tx-pipeline-{tag}-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(input_dir: PathBuf, output_dir: PathBuf) -> ImportConfig {
        ImportConfig {
            input_dir,
            output_dir,
            strict: false,
            dry_run: false,
            typos: TypoMap::builtin(),
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<String>>,
        written: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn rows_read(&self, _count: usize) {}
        fn artifact_written(&self, filename: &str, _current: usize, _total: usize) {
            self.written.lock().unwrap().push(filename.to_string());
        }
        fn done(&self, _result: &ImportResult) {
            self.phases.lock().unwrap().push("done".into());
        }
    }

    #[test]
    fn writes_all_artifacts() {
        let input = temp_dir("in");
        let output = temp_dir("out").join("nested");
        std::fs::write(
            input.join("a.csv"),
            "Level 1,Level 2,Level 3,Level 4\nAI,ML,Supervised,SVM; Linear Regression\n",
        )
        .unwrap();

        let progress = RecordingProgress::default();
        let result = run_import(&config(input.clone(), output.clone()), &progress).unwrap();

        assert_eq!(result.written.len(), 5);
        for meta in &result.written {
            assert!(output.join(&meta.filename).is_file(), "{}", meta.filename);
        }
        assert_eq!(progress.written.lock().unwrap().len(), 5);
        assert_eq!(progress.phases.lock().unwrap().last().unwrap(), "done");
        assert!(!result.strict_violation());

        let _ = std::fs::remove_dir_all(&input);
        let _ = std::fs::remove_dir_all(output.parent().unwrap());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let input = temp_dir("in");
        let output = temp_dir("out").join("never");
        std::fs::write(input.join("a.csv"), "Terms\nX\n").unwrap();

        let mut cfg = config(input.clone(), output.clone());
        cfg.dry_run = true;
        let result = run_import(&cfg, &SilentProgress).unwrap();

        assert!(result.written.is_empty());
        assert!(!output.exists());
        assert!(result.artifact(DQ_REPORT_MD).is_some());

        let _ = std::fs::remove_dir_all(&input);
        let _ = std::fs::remove_dir_all(output.parent().unwrap());
    }

    #[test]
    fn zero_terms_fails_before_writing() {
        let input = temp_dir("in");
        let output = temp_dir("out").join("never");
        std::fs::write(input.join("a.csv"), "Level 1,Level 4\nAI,\nAI, ; \n").unwrap();

        let err = run_import(&config(input.clone(), output.clone()), &SilentProgress).unwrap_err();
        assert!(matches!(err, TaxonomyError::NoTerms));
        assert!(!output.exists());

        let _ = std::fs::remove_dir_all(&input);
        let _ = std::fs::remove_dir_all(output.parent().unwrap());
    }

    #[test]
    fn strict_run_with_issues_still_writes() {
        let input = temp_dir("in");
        let output = temp_dir("out");
        std::fs::write(input.join("a.csv"), "Level 4\nCI/CD\n").unwrap();

        let mut cfg = config(input.clone(), output.clone());
        cfg.strict = true;
        let result = run_import(&cfg, &SilentProgress).unwrap();

        assert!(result.strict_violation());
        assert!(output.join(DQ_REPORT_MD).is_file());

        let _ = std::fs::remove_dir_all(&input);
        let _ = std::fs::remove_dir_all(&output);
    }

    #[test]
    fn missing_input_column_is_fatal() {
        let input = temp_dir("in");
        std::fs::write(input.join("a.csv"), "Level 1,Notes\nAI,x\n").unwrap();

        let err = run_import(&config(input.clone(), input.join("out")), &SilentProgress).unwrap_err();
        assert!(matches!(err, TaxonomyError::MissingColumn { .. }));

        let _ = std::fs::remove_dir_all(&input);
    }

    #[test]
    fn buffers_import_in_memory() {
        let buffers = vec![
            NamedBuffer::new("b.csv", "Domain,Subdomain,Topic,Terms\nAI,ML,Supervised,SVM\n"),
            NamedBuffer::new("a.csv", "Domain,Subdomain,Topic,Terms\nAI,ML,Supervised,svm; SVM\n"),
        ];

        let result = import_buffers(buffers, &ImportOptions::default(), &SilentProgress).unwrap();

        assert!(result.written.is_empty());
        assert_eq!(result.stats.files_processed, 2);
        let clean = result.artifact(TAXONOMY_CLEAN_CSV).unwrap().text().into_owned();
        assert_eq!(
            clean,
            "level_1,level_2,level_3,level_4\r\nAI,ML,Supervised,SVM\r\nAI,ML,Supervised,svm\r\n"
        );
    }
}
