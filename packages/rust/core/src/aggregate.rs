//! Row-stream aggregation: rows in, sorted terms and run statistics out.

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use taxonomy_normalize::{
    TypoMap, build_taxon_path, dedupe_with_mapping, generate_taxon_id, generate_term_id,
    split_level4, trim,
};
use taxonomy_shared::{DqStats, IssueCategory, NormalizedTerm, Result, TaxonomyError, TaxonomyRow};

use crate::quality::check_suspicious_splits;

/// Accumulator for one import run.
///
/// Feed rows with [`Aggregator::push`], then call [`Aggregator::finish`].
#[derive(Debug)]
pub struct Aggregator<'a> {
    typos: &'a TypoMap,
    stats: DqStats,
    terms: Vec<NormalizedTerm>,
    seen_files: HashSet<String>,
}

impl<'a> Aggregator<'a> {
    pub fn new(typos: &'a TypoMap) -> Self {
        Self {
            typos,
            stats: DqStats::default(),
            terms: Vec::new(),
            seen_files: HashSet::new(),
        }
    }

    /// Fold one row into the run.
    pub fn push(&mut self, row: TaxonomyRow) {
        if self.seen_files.insert(row.source_file.clone()) {
            self.stats.files_processed += 1;
            debug!(file = %row.source_file, "processing file");
        }
        self.stats.total_rows += 1;

        let levels = [trim(row.level1.as_str()), trim(row.level2.as_str()), trim(row.level3.as_str())];

        let value_sets = [
            &mut self.stats.level1_values,
            &mut self.stats.level2_values,
            &mut self.stats.level3_values,
        ];
        for (level, set) in levels.iter().zip(value_sets) {
            if !level.is_empty() {
                set.insert(level.clone());
            }
        }
        for (i, level) in levels.iter().enumerate() {
            if level.is_empty() {
                self.stats.add_issue(
                    IssueCategory::MissingLevel,
                    row.row_index,
                    &row.source_file,
                    format!("Missing L{}", i + 1),
                );
            }
        }

        let [level1, level2, level3] = levels;
        let taxon_path = build_taxon_path(&level1, &level2, &level3);
        let taxon_id = generate_taxon_id(&taxon_path);

        let raw_terms = split_level4(&row.level4_raw);
        if raw_terms.is_empty() {
            self.stats.add_issue(
                IssueCategory::EmptyTerm,
                row.row_index,
                &row.source_file,
                "Empty L4 after split",
            );
            return;
        }

        for (term_raw, term_norm) in dedupe_with_mapping(&raw_terms, self.typos) {
            let term_id = generate_term_id(&taxon_id, &term_norm);

            self.stats.level4_values.insert(term_norm.clone());
            *self.stats.term_counts.entry(term_norm.clone()).or_insert(0) += 1;

            for message in check_suspicious_splits(&term_norm) {
                self.stats.add_issue(
                    IssueCategory::SuspiciousSplit,
                    row.row_index,
                    &row.source_file,
                    format!("{term_norm}: {message}"),
                );
            }

            self.terms.push(NormalizedTerm {
                taxon_path: taxon_path.clone(),
                level1: level1.clone(),
                level2: level2.clone(),
                level3: level3.clone(),
                term_raw,
                term_norm,
                term_id,
                taxon_id,
                source_file: row.source_file.clone(),
                row_index: row.row_index,
            });
        }
    }

    /// Close the run: fix `unique_terms` and sort terms by
    /// `(taxon_path, term_norm, source_file, row_index)`.
    pub fn finish(mut self) -> (Vec<NormalizedTerm>, DqStats) {
        self.stats.unique_terms = self.stats.level4_values.len();
        self.terms.sort_by(|a, b| {
            (&a.taxon_path, &a.term_norm, &a.source_file, a.row_index)
                .cmp(&(&b.taxon_path, &b.term_norm, &b.source_file, b.row_index))
        });
        (self.terms, self.stats)
    }
}

/// Run the whole row stream through a fresh [`Aggregator`].
///
/// Stops at the first row error. An empty term list is not an error here;
/// callers decide what zero terms means.
#[instrument(skip_all)]
pub fn process_taxonomy<I>(rows: I, typos: &TypoMap) -> Result<(Vec<NormalizedTerm>, DqStats)>
where
    I: IntoIterator<Item = Result<TaxonomyRow>>,
{
    let aggregator = rows
        .into_iter()
        .try_fold(Aggregator::new(typos), |mut acc, row| {
            acc.push(row?);
            Ok::<_, TaxonomyError>(acc)
        })?;

    let (terms, stats) = aggregator.finish();

    info!(
        files = stats.files_processed,
        rows = stats.total_rows,
        terms = terms.len(),
        unique_terms = stats.unique_terms,
        issues = stats.issues.len(),
        "taxonomy processed"
    );

    Ok((terms, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxonomy_normalize::normalize_term;

    fn row(file: &str, index: u64, levels: [&str; 3], level4: &str) -> TaxonomyRow {
        TaxonomyRow {
            level1: levels[0].into(),
            level2: levels[1].into(),
            level3: levels[2].into(),
            level4_raw: level4.into(),
            source_file: file.into(),
            row_index: index,
        }
    }

    fn process(rows: Vec<TaxonomyRow>) -> (Vec<NormalizedTerm>, DqStats) {
        process_taxonomy(rows.into_iter().map(Ok), TypoMap::shared_builtin()).unwrap()
    }

    #[test]
    fn splits_normalizes_and_sorts() {
        let (terms, stats) = process(vec![row(
            "a.csv",
            2,
            [" AI ", "Machine Learning", "Supervised"],
            "SVM; Linear Regression;  machine learing ",
        )]);

        let norms: Vec<&str> = terms.iter().map(|t| t.term_norm.as_str()).collect();
        assert_eq!(norms, ["Linear Regression", "Machine Learning", "SVM"]);
        assert_eq!(terms[0].taxon_path, "AI > Machine Learning > Supervised");
        assert_eq!(terms[0].level1, "AI");
        assert_eq!(terms[1].term_raw, "machine learing");
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.total_rows, 1);
        assert_eq!(stats.unique_terms, 3);
        assert!(stats.issues.is_empty());
    }

    #[test]
    fn identifiers_follow_path_and_term() {
        let (terms, _) = process(vec![row("a.csv", 2, ["AI", "ML", "Supervised"], "SVM")]);
        let expected_taxon = generate_taxon_id("AI > ML > Supervised");
        assert_eq!(terms[0].taxon_id, expected_taxon);
        assert_eq!(terms[0].term_id, generate_term_id(&expected_taxon, "SVM"));
    }

    #[test]
    fn empty_level4_records_one_issue_and_no_terms() {
        let (terms, stats) = process(vec![
            row("a.csv", 2, ["AI", "ML", "Supervised"], ""),
            row("a.csv", 3, ["AI", "ML", "Supervised"], "   ;  ; "),
        ]);

        assert!(terms.is_empty());
        let empty = stats.issues_by_category(IssueCategory::EmptyTerm);
        assert_eq!(empty.len(), 2);
        assert_eq!(empty[0].row_index, 2);
        assert_eq!(empty[0].description, "Empty L4 after split");
        assert_eq!(stats.total_rows, 2);
    }

    #[test]
    fn missing_levels_are_reported_per_level() {
        let (terms, stats) = process(vec![row("a.csv", 4, ["", "  ", "Topic"], "X")]);

        let missing: Vec<&str> = stats
            .issues_by_category(IssueCategory::MissingLevel)
            .iter()
            .map(|i| i.description.as_str())
            .collect();
        assert_eq!(missing, ["Missing L1", "Missing L2"]);
        assert_eq!(terms[0].taxon_path, " >  > Topic");
        assert!(stats.level1_values.is_empty());
        assert!(stats.level3_values.contains("Topic"));
    }

    #[test]
    fn cross_row_duplicates_count_twice_but_dedupe_per_row() {
        let (terms, stats) = process(vec![
            row("a.csv", 2, ["AI", "ML", "Supervised"], "SVM; SVM ; SVM"),
            row("b.csv", 2, ["AI", "ML", "Supervised"], "SVM"),
        ]);

        assert_eq!(stats.term_counts["SVM"], 2);
        assert_eq!(terms.len(), 2);
        assert_eq!(stats.files_processed, 2);
        assert_eq!(terms[0].source_file, "a.csv");
        assert_eq!(terms[1].source_file, "b.csv");
    }

    #[test]
    fn suspicious_terms_are_described_with_the_term() {
        let (_, stats) = process(vec![row("a.csv", 5, ["Eng", "Ops", "Delivery"], "CI/CD; Cats or Dogs")]);

        let descriptions: Vec<&str> = stats
            .issues_by_category(IssueCategory::SuspiciousSplit)
            .iter()
            .map(|i| i.description.as_str())
            .collect();
        assert_eq!(
            descriptions,
            [
                "CI/CD: contains \"/\" - consider splitting?",
                "Cats or Dogs: contains \" or \" - consider splitting?",
            ]
        );
    }

    #[test]
    fn terms_round_trip_through_normalization() {
        let (terms, _) = process(vec![
            row("a.csv", 2, ["AI", "ML", "x"], " Postgre SQL ; postgresql; Mongo DB;mongod b"),
            row("a.csv", 3, ["AI", "ML", "x"], "Deep Learing (CNN; RNN); deep learning"),
        ]);
        for term in &terms {
            assert_eq!(normalize_term(&term.term_raw), term.term_norm);
        }
    }

    #[test]
    fn custom_typo_table_is_used() {
        let mut typos = TypoMap::empty();
        typos.insert("k8s", "Kubernetes");
        let rows = vec![Ok(row("a.csv", 2, ["Ops", "Infra", "Orchestration"], "k8s; Kubernetes"))];

        let (terms, _) = process_taxonomy(rows, &typos).unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].term_raw, "k8s");
        assert_eq!(terms[0].term_norm, "Kubernetes");
    }

    #[test]
    fn row_error_stops_the_fold() {
        let rows = vec![
            Ok(row("a.csv", 2, ["AI", "ML", "x"], "A")),
            Err(TaxonomyError::csv("b.csv", "bad record")),
        ];
        let err = process_taxonomy(rows, TypoMap::shared_builtin()).unwrap_err();
        assert!(err.to_string().contains("b.csv"));
    }
}
