//! Output module for rendering operation results
//!
//! This module handles:
//! - Tab-separated text tables for every operation
//! - The standalone HTML tag cloud for keyword reports
//! - Writing a rendering to a file or stdout

mod cloud;
mod text;

pub use cloud::{generate_word_cloud_html, hls_to_rgb, CloudOptions};
pub use text::{
    format_ctr, format_keyword_report, format_param_tally, format_robots_verdicts,
    format_sitemap_report, KEYWORD_HEADER, SITEMAP_HEADER,
};

use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes a rendering to `path`, or to stdout when `path` is `None`
///
/// A trailing newline is added when the rendering lacks one.
pub fn write_rendering(content: &str, path: Option<&Path>) -> OutputResult<()> {
    let newline = if content.ends_with('\n') { "" } else { "\n" };

    match path {
        Some(path) => {
            let write = || -> std::io::Result<()> {
                let mut file = File::create(path)?;
                file.write_all(content.as_bytes())?;
                file.write_all(newline.as_bytes())?;
                Ok(())
            };
            write().map_err(|source| OutputError::Write {
                path: path.display().to_string(),
                source,
            })?;
            tracing::info!("Output written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes())?;
            handle.write_all(newline.as_bytes())?;
            handle.flush()?;
        }
    }
    Ok(())
}
