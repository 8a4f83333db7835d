//! CSV artifacts: `taxonomy_clean.csv` and `terms_normalized.csv`.
//!
//! Both use minimal quoting and CRLF record terminators.

use std::collections::HashSet;

use taxonomy_shared::{NormalizedTerm, Result, TaxonomyError};

/// Header of the clean CSV.
pub const CLEAN_HEADER: [&str; 4] = ["level_1", "level_2", "level_3", "level_4"];

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| TaxonomyError::serialization(format!("CSV flush failed: {}", e.error())))
}

fn csv_err(e: csv::Error) -> TaxonomyError {
    TaxonomyError::serialization(format!("CSV write failed: {e}"))
}

/// Render one row per distinct `(level1, level2, level3, term_norm)`.
///
/// `terms` is expected in final sorted order; the first occurrence of each
/// key is the one written.
pub fn render_clean_csv(terms: &[NormalizedTerm]) -> Result<Vec<u8>> {
    let mut wtr = writer();
    wtr.write_record(CLEAN_HEADER).map_err(csv_err)?;

    let mut seen: HashSet<(&str, &str, &str, &str)> = HashSet::new();
    for term in terms {
        let key = (
            term.level1.as_str(),
            term.level2.as_str(),
            term.level3.as_str(),
            term.term_norm.as_str(),
        );
        if seen.insert(key) {
            wtr.write_record([key.0, key.1, key.2, key.3])
                .map_err(csv_err)?;
        }
    }

    finish(wtr)
}

/// Render every term with all ten fields, one row per term.
pub fn render_terms_normalized(terms: &[NormalizedTerm]) -> Result<Vec<u8>> {
    let mut wtr = writer();
    wtr.write_record(NormalizedTerm::FIELDS).map_err(csv_err)?;
    for term in terms {
        wtr.serialize(term).map_err(csv_err)?;
    }
    finish(wtr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxonomy_shared::{TaxonId, TermId};
    use uuid::Uuid;

    fn term(l1: &str, l3: &str, raw: &str, norm: &str, row: u64) -> NormalizedTerm {
        NormalizedTerm {
            taxon_path: format!("{l1} > ML > {l3}"),
            level1: l1.into(),
            level2: "ML".into(),
            level3: l3.into(),
            term_raw: raw.into(),
            term_norm: norm.into(),
            term_id: TermId(Uuid::from_u128(row as u128)),
            taxon_id: TaxonId(Uuid::from_u128(0xabc)),
            source_file: "a.csv".into(),
            row_index: row,
        }
    }

    #[test]
    fn clean_csv_dedupes_on_levels_and_term() {
        let terms = vec![
            term("AI", "Supervised", "svm", "SVM", 2),
            term("AI", "Supervised", "SVM ", "SVM", 5),
            term("AI", "Unsupervised", "SVM", "SVM", 3),
        ];
        let out = String::from_utf8(render_clean_csv(&terms).unwrap()).unwrap();
        assert_eq!(
            out,
            "level_1,level_2,level_3,level_4\r\n\
             AI,ML,Supervised,SVM\r\n\
             AI,ML,Unsupervised,SVM\r\n"
        );
    }

    #[test]
    fn clean_csv_quotes_only_when_needed() {
        let terms = vec![term("AI", "Supervised", "x", "Trees, Forests", 2)];
        let out = String::from_utf8(render_clean_csv(&terms).unwrap()).unwrap();
        assert!(out.ends_with("AI,ML,Supervised,\"Trees, Forests\"\r\n"));
    }

    #[test]
    fn normalized_csv_has_all_fields_in_order() {
        let terms = vec![term("AI", "Supervised", " svm", "SVM", 7)];
        let out = String::from_utf8(render_terms_normalized(&terms).unwrap()).unwrap();
        let mut lines = out.split("\r\n");

        assert_eq!(
            lines.next(),
            Some("taxon_path,level1,level2,level3,term_raw,term_norm,term_id,taxon_id,source_file,row_index")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("AI > ML > Supervised,AI,ML,Supervised, svm,SVM,"));
        assert!(row.contains(&Uuid::from_u128(7).to_string()));
        assert!(row.ends_with(",a.csv,7"));
    }

    #[test]
    fn empty_term_list_is_header_only() {
        let out = render_terms_normalized(&[]).unwrap();
        assert_eq!(out.iter().filter(|b| **b == b'\n').count(), 1);
    }
}
