//! Export artifact retrieval
//!
//! A finished job points at a file on a delivery host. The file is streamed to disk
//! chunk by chunk; a `.gz` artifact is then inflated next to it so the report readers
//! can open the result directly.

use crate::http::FetchError;
use flate2::read::GzDecoder;
use futures_util::StreamExt;
use reqwest::Client;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Artifact download errors
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Cannot derive a file name from {0}")]
    NoFileName(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Decompression task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Files produced by [`download_artifact`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    /// The file as served
    pub archive: PathBuf,
    /// Inflated copy of a `.gz` artifact
    pub extracted: Option<PathBuf>,
}

impl DownloadedArtifact {
    /// The file to hand to the report readers
    pub fn report_path(&self) -> &Path {
        self.extracted.as_deref().unwrap_or(&self.archive)
    }
}

/// Streams `url` into `dest_dir`, inflating gzip artifacts
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - Download URL returned by a finished job
/// * `dest_dir` - Existing directory receiving the file
///
/// # Returns
///
/// * `Ok(DownloadedArtifact)` - The saved file and, for `.gz`, its inflated copy
/// * `Err(DownloadError)` - Transport failure, non-2xx status or a write error
pub async fn download_artifact(
    client: &Client,
    url: &str,
    dest_dir: &Path,
) -> Result<DownloadedArtifact, DownloadError> {
    let name = artifact_file_name(url).ok_or_else(|| DownloadError::NoFileName(url.to_string()))?;
    let archive = dest_dir.join(&name);
    tracing::info!("Downloading {} to {}", url, archive.display());

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let write_error = |source: std::io::Error| DownloadError::Io {
        path: archive.clone(),
        source,
    };
    let mut file = tokio::fs::File::create(&archive).await.map_err(write_error)?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(write_error)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(write_error)?;
    tracing::debug!("Wrote {} bytes to {}", written, archive.display());

    let extracted = match name.strip_suffix(".gz") {
        Some(stem) if !stem.is_empty() => {
            let target = dest_dir.join(stem);
            let (source, destination) = (archive.clone(), target.clone());
            let inflated =
                tokio::task::spawn_blocking(move || gunzip(&source, &destination)).await??;
            tracing::info!("Extracted {} bytes to {}", inflated, target.display());
            Some(target)
        }
        _ => None,
    };

    Ok(DownloadedArtifact { archive, extracted })
}

/// Last path segment of a download URL
fn artifact_file_name(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn gunzip(source: &Path, destination: &Path) -> Result<u64, DownloadError> {
    let input = File::open(source).map_err(|e| DownloadError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;
    let mut decoder = GzDecoder::new(BufReader::new(input));
    let mut output = File::create(destination).map_err(|e| DownloadError::Io {
        path: destination.to_path_buf(),
        source: e,
    })?;
    std::io::copy(&mut decoder, &mut output).map_err(|e| DownloadError::Io {
        path: destination.to_path_buf(),
        source: e,
    })
}
