//! CSV taxonomy parsing.
//!
//! Turns one or more CSV sources into a lazy stream of [`TaxonomyRow`]s:
//! - headers are resolved through the alias table in [`columns`]
//! - a leading UTF-8 byte-order mark is tolerated
//! - rows are numbered from 2 (the header is row 1)
//!
//! Sources are either files in a directory ([`parse_directory`]) or named
//! in-memory buffers ([`parse_buffers`]); both are read in file-name order.

pub mod columns;

use std::collections::{BTreeMap, VecDeque};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use taxonomy_shared::{Result, TaxonomyError, TaxonomyRow};

pub use columns::{Column, ColumnMap, ResolvedColumn, detect_columns, resolve_column};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Row number of the first data record.
const FIRST_DATA_ROW: u64 = 2;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Something that can be opened as a named CSV byte stream.
pub trait CsvSource {
    type Reader: Read;

    /// Name recorded as `source_file` on every row.
    fn name(&self) -> String;

    /// Open the source for reading.
    fn open(self) -> Result<Self::Reader>;
}

impl CsvSource for PathBuf {
    type Reader = File;

    fn name(&self) -> String {
        file_name(self)
    }

    fn open(self) -> Result<File> {
        File::open(&self).map_err(|e| TaxonomyError::io(&self, e))
    }
}

/// An uploaded file: a name plus its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBuffer {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedBuffer {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl CsvSource for NamedBuffer {
    type Reader = io::Cursor<Vec<u8>>;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn open(self) -> Result<Self::Reader> {
        Ok(io::Cursor::new(self.bytes))
    }
}

// ---------------------------------------------------------------------------
// Single-source parsing
// ---------------------------------------------------------------------------

type BomStripped<R> = io::Chain<io::Cursor<Vec<u8>>, R>;

/// Lazy row iterator over one CSV source.
pub struct CsvRows<R: Read> {
    name: String,
    columns: ColumnMap,
    records: csv::StringRecordsIntoIter<BomStripped<R>>,
    next_row: u64,
    failed: bool,
}

impl<R: Read> std::fmt::Debug for CsvRows<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvRows")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("next_row", &self.next_row)
            .finish_non_exhaustive()
    }
}

impl<R: Read> CsvRows<R> {
    /// Name of the source being read.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn cell(&self, record: &csv::StringRecord, column: Column) -> String {
        self.columns
            .position(column)
            .and_then(|i| record.get(i))
            .unwrap_or_default()
            .to_string()
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<TaxonomyRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => {
                self.failed = true;
                return Some(Err(TaxonomyError::csv(&self.name, e.to_string())));
            }
        };

        let row = TaxonomyRow {
            level1: self.cell(&record, Column::Level1),
            level2: self.cell(&record, Column::Level2),
            level3: self.cell(&record, Column::Level3),
            level4_raw: self.cell(&record, Column::Level4),
            source_file: self.name.clone(),
            row_index: self.next_row,
        };
        self.next_row += 1;

        Some(Ok(row))
    }
}

/// Parse a CSV stream under the given source name.
///
/// Reads and resolves the header eagerly; data rows are read lazily.
pub fn parse_reader<R: Read>(name: &str, reader: R) -> Result<CsvRows<R>> {
    let stripped = strip_bom(reader).map_err(|e| TaxonomyError::csv(name, e.to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(stripped);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| TaxonomyError::csv(name, e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err(TaxonomyError::EmptyFile {
            file: name.to_string(),
        });
    }

    let columns = detect_columns(name, &headers)?;
    debug!(file = name, ?headers, "resolved CSV columns");

    Ok(CsvRows {
        name: name.to_string(),
        columns,
        records: reader.into_records(),
        next_row: FIRST_DATA_ROW,
        failed: false,
    })
}

/// Parse one CSV file. Rows carry the file name (not the full path).
pub fn parse_csv(path: &Path) -> Result<CsvRows<File>> {
    let path = path.to_path_buf();
    let name = path.name();
    let file = path.open()?;
    parse_reader(&name, file)
}

/// Consume a leading UTF-8 BOM, if present.
fn strip_bom<R: Read>(mut reader: R) -> io::Result<BomStripped<R>> {
    let mut prefix = Vec::with_capacity(UTF8_BOM.len());
    (&mut reader)
        .take(UTF8_BOM.len() as u64)
        .read_to_end(&mut prefix)?;
    if prefix == UTF8_BOM {
        prefix.clear();
    }
    Ok(io::Cursor::new(prefix).chain(reader))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Multi-source parsing
// ---------------------------------------------------------------------------

/// Row stream over several sources, read one after another.
///
/// Each source is opened only when the previous one is exhausted. The first
/// error ends the stream.
pub struct SourceRows<S: CsvSource> {
    pending: VecDeque<S>,
    current: Option<CsvRows<S::Reader>>,
    rows_in_current: u64,
    failed: bool,
}

impl<S: CsvSource> std::fmt::Debug for SourceRows<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRows")
            .field("pending", &self.pending.len())
            .field("rows_in_current", &self.rows_in_current)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl<S: CsvSource> SourceRows<S> {
    fn new(sources: Vec<S>) -> Self {
        Self {
            pending: sources.into(),
            current: None,
            rows_in_current: 0,
            failed: false,
        }
    }

    fn open_next(&mut self) -> Option<Result<()>> {
        let source = self.pending.pop_front()?;
        let name = source.name();
        let opened = source.open().and_then(|reader| parse_reader(&name, reader));
        Some(opened.map(|rows| {
            debug!(file = %name, "reading CSV source");
            self.current = Some(rows);
            self.rows_in_current = 0;
        }))
    }
}

impl<S: CsvSource> Iterator for SourceRows<S> {
    type Item = Result<TaxonomyRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }

            if let Some(rows) = self.current.as_mut() {
                match rows.next() {
                    Some(Ok(row)) => {
                        self.rows_in_current += 1;
                        return Some(Ok(row));
                    }
                    Some(Err(e)) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                    None => {
                        if self.rows_in_current == 0 {
                            warn!(file = rows.name(), "CSV source has a header but no rows");
                        }
                        self.current = None;
                    }
                }
            }

            match self.open_next()? {
                Ok(()) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Parse every `*.csv` file in `dir`, in file-name order.
///
/// Fails with [`TaxonomyError::NoInputFiles`] before reading any row when the
/// directory holds no CSV files.
pub fn parse_directory(dir: &Path) -> Result<SourceRows<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| TaxonomyError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| TaxonomyError::io(dir, e))?.path();
        if path.is_file() && has_csv_extension(&file_name(&path)) {
            files.push(path);
        }
    }
    files.sort_by_key(|p| file_name(p));

    if files.is_empty() {
        return Err(TaxonomyError::NoInputFiles {
            dir: dir.to_path_buf(),
        });
    }

    debug!(dir = %dir.display(), files = files.len(), "found CSV inputs");
    Ok(SourceRows::new(files))
}

/// Parse in-memory CSV buffers as if they were files in one directory.
///
/// Only names ending in `.csv` are read, in name order; a later buffer with
/// the same name replaces an earlier one.
pub fn parse_buffers(buffers: Vec<NamedBuffer>) -> Result<SourceRows<NamedBuffer>> {
    let by_name: BTreeMap<String, NamedBuffer> = buffers
        .into_iter()
        .filter(|b| has_csv_extension(&b.name))
        .map(|b| (b.name.clone(), b))
        .collect();

    if by_name.is_empty() {
        return Err(TaxonomyError::NoInputFiles {
            dir: PathBuf::from("<uploaded files>"),
        });
    }

    Ok(SourceRows::new(by_name.into_values().collect()))
}

fn has_csv_extension(name: &str) -> bool {
    name.ends_with(".csv")
}
