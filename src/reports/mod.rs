//! Report export access
//!
//! Keyword and crawl exports are comma-delimited files, optionally shipped inside a
//! single-entry zip archive. This module opens either form and walks its records.

mod source;
mod table;

pub use source::ReportSource;
pub use table::{count_rows, read_url_column, ReportHeader, ReportReader};

use std::path::PathBuf;
use thiserror::Error;

/// File-level report errors; these abort the whole read
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Zip archive {} contains no file", .0.display())]
    EmptyArchive(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Report has no header row")]
    MissingHeader,

    #[error("Column '{0}' not found in report header")]
    MissingColumn(String),
}
