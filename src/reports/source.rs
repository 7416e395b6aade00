//! Report file access
//!
//! Exports arrive either as a plain CSV file or as a zip archive holding a single CSV.
//! Both can be opened any number of times, which the row-count pre-scan relies on.

use crate::reports::ReportError;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Location of a report export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    /// Plain delimited text file
    Plain(PathBuf),
    /// Zip archive; the first entry is the report
    Zipped(PathBuf),
}

impl ReportSource {
    /// Picks the variant from the file extension (`.zip`, any case)
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let is_zip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

        if is_zip {
            Self::Zipped(path)
        } else {
            Self::Plain(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Plain(path) | Self::Zipped(path) => path,
        }
    }

    /// Opens the report from the start and hands a reader to `f`
    ///
    /// Every call re-opens the underlying file, so it can be used once for a
    /// pre-scan and once more for the real pass.
    pub fn with_reader<T, F>(&self, f: F) -> Result<T, ReportError>
    where
        F: FnOnce(&mut dyn Read) -> Result<T, ReportError>,
    {
        match self {
            Self::Plain(path) => {
                let mut reader = BufReader::new(File::open(path)?);
                f(&mut reader)
            }
            Self::Zipped(path) => {
                let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
                if archive.len() == 0 {
                    return Err(ReportError::EmptyArchive(path.clone()));
                }
                let mut entry = archive.by_index(0)?;
                tracing::debug!("Reading '{}' from {}", entry.name(), path.display());
                f(&mut entry)
            }
        }
    }
}
