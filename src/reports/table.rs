//! Delimited report reading
//!
//! Exports start with a `sep=,` declaration line followed by the header row. The
//! reader skips the declaration, resolves columns by header name and yields the
//! remaining records numbered from 1.

use crate::progress::{percent_of, ProgressSink};
use crate::reports::{ReportError, ReportSource};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;

/// Header row of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    columns: Vec<String>,
}

impl ReportHeader {
    fn from_record(record: &StringRecord) -> Self {
        let columns = record.iter().map(clean_header_cell).collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of the column named exactly `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`ReportHeader::index_of`] but a missing column is an error
    pub fn require(&self, name: &str) -> Result<usize, ReportError> {
        self.index_of(name)
            .ok_or_else(|| ReportError::MissingColumn(name.to_string()))
    }
}

fn clean_header_cell(cell: &str) -> String {
    cell.trim_start_matches('\u{feff}').trim().to_string()
}

fn has_columns(record: &StringRecord, required: &[&str]) -> bool {
    required
        .iter()
        .all(|name| record.iter().any(|cell| clean_header_cell(cell) == *name))
}

/// Record reader positioned after the header row
pub struct ReportReader<R> {
    inner: csv::Reader<R>,
    header: ReportHeader,
}

impl<R: Read> ReportReader<R> {
    /// Consumes the preamble and header
    ///
    /// The first record is taken as the header only when `required` is non-empty and
    /// the record names every required column; otherwise it is the separator
    /// declaration and the header is the second record. Every `required` column must
    /// be present in the header.
    pub fn open(reader: R, required: &[&str]) -> Result<Self, ReportError> {
        let mut inner = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut record = StringRecord::new();
        if !inner.read_record(&mut record)? {
            return Err(ReportError::MissingHeader);
        }
        if required.is_empty() || !has_columns(&record, required) {
            if !inner.read_record(&mut record)? {
                return Err(ReportError::MissingHeader);
            }
        }

        let header = ReportHeader::from_record(&record);
        for name in required {
            header.require(name)?;
        }

        Ok(Self { inner, header })
    }

    pub fn header(&self) -> &ReportHeader {
        &self.header
    }

    /// Data records with their 1-based row number
    ///
    /// A record that fails to decode is yielded as an error; the caller decides
    /// whether it is fatal with [`csv::Error::is_io_error`].
    pub fn records(
        &mut self,
    ) -> impl Iterator<Item = (usize, Result<StringRecord, csv::Error>)> + '_ {
        self.inner
            .records()
            .enumerate()
            .map(|(i, record)| (i + 1, record))
    }
}

/// Counts the data rows of a report, used to scale progress before the real pass
pub fn count_rows(source: &ReportSource, required: &[&str]) -> Result<usize, ReportError> {
    source.with_reader(|r| {
        let mut reader = ReportReader::open(r, required)?;
        let mut count = 0usize;
        for (_, record) in reader.records() {
            if let Err(e) = record {
                if e.is_io_error() {
                    return Err(e.into());
                }
            }
            count += 1;
        }
        Ok(count)
    })
}

/// Reads the first column of a crawl export
///
/// Blank cells and undecodable rows are skipped. Progress is the share of rows read,
/// against a pre-scan count.
pub fn read_url_column(
    path: &Path,
    progress: &dyn ProgressSink,
) -> Result<Vec<String>, ReportError> {
    let source = ReportSource::from_path(path);
    let total = count_rows(&source, &[])?;
    tracing::info!("Reading URL column from {} ({} rows)", path.display(), total);

    source.with_reader(|r| {
        let mut reader = ReportReader::open(r, &[])?;
        let mut urls = Vec::with_capacity(total);
        for (row, record) in reader.records() {
            match record {
                Ok(record) => {
                    if let Some(url) = record.get(0).map(str::trim).filter(|u| !u.is_empty()) {
                        urls.push(url.to_string());
                    }
                }
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => tracing::warn!("Skipping row {}: {}", row, e),
            }
            progress.report(percent_of(row, total));
        }
        Ok(urls)
    })
}
