use crate::config::JobsConfig;
use crate::jobs::{Clock, JobApi, JobError, JobOutcome, JobStatus};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Submits a job and polls it to a terminal state
///
/// The status is checked right after submission, then every `poll_interval` until
/// `max_wait` has elapsed. The last sleep is shortened so a final check lands on the
/// deadline. Cancellation is observed at every tick, including mid-sleep.
pub struct JobPoller<A, C> {
    api: A,
    clock: C,
    poll_interval: Duration,
    max_wait: Duration,
    cancel: CancellationToken,
}

impl<A: JobApi, C: Clock> JobPoller<A, C> {
    pub fn new(api: A, clock: C, poll_interval: Duration, max_wait: Duration) -> Self {
        Self {
            api,
            clock,
            poll_interval,
            max_wait,
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(api: A, clock: C, config: &JobsConfig) -> Self {
        Self::new(
            api,
            clock,
            Duration::from_secs(config.poll_interval_secs),
            Duration::from_secs(config.max_wait_secs),
        )
    }

    /// Replaces the cancellation token, e.g. with one tied to Ctrl-C
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Submits `request` and waits for the job to finish
    ///
    /// # Returns
    ///
    /// * `Ok(JobOutcome)` - The job reached `DONE`
    /// * `Err(JobError::Submit)` - The creation response was not `CREATED`; nothing was polled
    /// * `Err(JobError)` - Failure, timeout, cancellation or transport error
    pub async fn submit_and_await(&self, request: &Value) -> Result<JobOutcome, JobError> {
        let handle = self.api.submit(request).await?;
        if handle.status != JobStatus::Created {
            tracing::warn!("Job submission answered {}", handle.status);
            return Err(JobError::Submit {
                status: handle.status.to_string(),
                payload: handle.payload.to_string(),
            });
        }

        let job_id = handle.job_id.ok_or_else(|| {
            JobError::MalformedResponse(format!("no job_id in {}", handle.payload))
        })?;
        tracing::info!("Job {} created", job_id);

        self.await_job(&job_id).await
    }

    /// Polls an existing job until it is `DONE`, `FAILED`, timed out or cancelled
    pub async fn await_job(&self, job_id: &str) -> Result<JobOutcome, JobError> {
        let started = self.clock.now();
        let mut polls = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(job_id));
            }

            let handle = tokio::select! {
                _ = self.cancel.cancelled() => return Err(self.cancelled(job_id)),
                handle = self.api.status(job_id) => handle?,
            };
            polls += 1;
            tracing::debug!("Job {} poll #{}: {}", job_id, polls, handle.status);

            match handle.status {
                JobStatus::Done => {
                    return Ok(match handle.download_url {
                        Some(download_url) => {
                            tracing::info!("Job {} done after {} polls", job_id, polls);
                            JobOutcome::Completed { download_url }
                        }
                        None => {
                            tracing::warn!("Job {} done without a download URL", job_id);
                            JobOutcome::CompletedWithoutArtifact
                        }
                    });
                }
                JobStatus::Failed => {
                    return Err(JobError::Failed {
                        job_id: job_id.to_string(),
                        payload: handle.payload.to_string(),
                    });
                }
                _ => {}
            }

            let waited = self.clock.now().saturating_sub(started);
            if waited >= self.max_wait {
                tracing::warn!("Job {} still {} after {:?}", job_id, handle.status, waited);
                return Err(JobError::Timeout {
                    job_id: job_id.to_string(),
                    waited,
                });
            }

            let pause = self.poll_interval.min(self.max_wait - waited);
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(self.cancelled(job_id)),
                _ = self.clock.sleep(pause) => {}
            }
        }
    }

    fn cancelled(&self, job_id: &str) -> JobError {
        tracing::info!("Stopped waiting for job {}", job_id);
        JobError::Cancelled {
            job_id: job_id.to_string(),
        }
    }
}
