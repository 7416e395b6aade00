//! Remote export jobs
//!
//! The analytics API runs exports asynchronously: a job is submitted, reported as
//! `CREATED`, then polled until it is `DONE` (with a download URL) or `FAILED`.
//!
//! The poller only talks to the API through the [`JobApi`] trait and only waits
//! through the [`Clock`] trait, so the whole state machine runs in tests without
//! a server or real delays.

mod api;
mod clock;
mod download;
mod poller;

pub use api::{HttpJobApi, JobApi, TOKEN_ENV_VAR};
pub use clock::{Clock, TokioClock};
pub use download::{download_artifact, DownloadError, DownloadedArtifact};
pub use poller::JobPoller;

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Job lifecycle errors
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Job API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Job was not created (status: {status}): {payload}")]
    Submit { status: String, payload: String },

    #[error("Job {job_id} failed: {payload}")]
    Failed { job_id: String, payload: String },

    #[error("Job {job_id} did not finish within {waited:?}")]
    Timeout { job_id: String, waited: Duration },

    #[error("Job {job_id} was cancelled while waiting")]
    Cancelled { job_id: String },

    #[error("Malformed job API response: {0}")]
    MalformedResponse(String),

    #[error("No API token configured (set [jobs] token or {})", TOKEN_ENV_VAR)]
    MissingToken,
}

/// Server-side job state
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum JobStatus {
    Created,
    Running,
    Done,
    Failed,
    /// Any state this client does not know; polling continues
    Other(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "CREATED" => Self::Created,
            "RUNNING" | "PROCESSING" => Self::Running,
            "DONE" => Self::Done,
            "FAILED" => Self::Failed,
            _ => Self::Other(value),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Running => write!(f, "RUNNING"),
            Self::Done => write!(f, "DONE"),
            Self::Failed => write!(f, "FAILED"),
            Self::Other(status) => write!(f, "{}", status),
        }
    }
}

/// Snapshot of a job as reported by the API
#[derive(Debug, Clone, PartialEq)]
pub struct JobHandle {
    pub job_id: Option<String>,
    pub status: JobStatus,
    pub download_url: Option<String>,
    /// Raw response body, kept for diagnostics
    pub payload: Value,
}

#[derive(Deserialize)]
struct JobResponse {
    job_id: Option<Value>,
    job_status: Option<JobStatus>,
    results: Option<JobResults>,
}

#[derive(Deserialize)]
struct JobResults {
    download_url: Option<String>,
}

impl JobHandle {
    /// Reads `job_id`, `job_status` and `results.download_url` from a response body
    pub fn from_payload(payload: Value) -> Result<Self, JobError> {
        let response: JobResponse = serde_json::from_value(payload.clone())
            .map_err(|e| JobError::MalformedResponse(e.to_string()))?;

        let status = response
            .job_status
            .ok_or_else(|| JobError::MalformedResponse(format!("no job_status in {}", payload)))?;

        let job_id = match response.job_id {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        Ok(Self {
            job_id,
            status,
            download_url: response
                .results
                .and_then(|r| r.download_url)
                .filter(|url| !url.is_empty()),
            payload,
        })
    }
}

/// How a finished job ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { download_url: String },
    /// The job reached `DONE` but reported no download URL
    CompletedWithoutArtifact,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_from_string() {
        assert_eq!(JobStatus::from("CREATED".to_string()), JobStatus::Created);
        assert_eq!(JobStatus::from("processing".to_string()), JobStatus::Running);
        assert_eq!(
            JobStatus::from("QUEUED".to_string()),
            JobStatus::Other("QUEUED".to_string())
        );
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn test_handle_from_payload() {
        let handle = JobHandle::from_payload(json!({
            "job_id": 4242,
            "job_status": "DONE",
            "results": {"download_url": "https://d.example.com/export.zip"}
        }))
        .unwrap();
        assert_eq!(handle.job_id.as_deref(), Some("4242"));
        assert_eq!(handle.status, JobStatus::Done);
        assert_eq!(
            handle.download_url.as_deref(),
            Some("https://d.example.com/export.zip")
        );
    }

    #[test]
    fn test_handle_without_results() {
        let handle =
            JobHandle::from_payload(json!({"job_id": "abc", "job_status": "RUNNING", "results": null}))
                .unwrap();
        assert_eq!(handle.job_id.as_deref(), Some("abc"));
        assert_eq!(handle.download_url, None);
    }

    #[test]
    fn test_handle_without_status() {
        assert!(matches!(
            JobHandle::from_payload(json!({"error": "bad token"})),
            Err(JobError::MalformedResponse(_))
        ));
        assert!(matches!(
            JobHandle::from_payload(json!([1, 2])),
            Err(JobError::MalformedResponse(_))
        ));
    }
}
