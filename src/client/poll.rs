use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::{ClientError, Result, UNKNOWN_JOB_ERROR};
use super::models::{Job, JobStatus};
use super::transport::Transport;
use super::TornadoClient;

/// Parameters of a single wait-for-completion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRequest {
    pub job_id: String,
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollRequest {
    pub fn new(job_id: impl Into<String>, timeout: Duration, interval: Duration) -> Self {
        Self {
            job_id: job_id.into(),
            timeout,
            interval,
        }
    }
}

impl<T: Transport> TornadoClient<T> {
    /// Poll a job until it completes, fails, or `timeout` elapses
    ///
    /// Returns the first snapshot whose status is `Completed`. A `Failed`
    /// snapshot ends the wait with [`ClientError::JobFailed`]; running out of
    /// time ends it with [`ClientError::Timeout`] carrying the last status.
    /// Fetch errors are returned as-is, nothing is retried.
    pub async fn wait_for_completion(&self, request: PollRequest) -> Result<Job> {
        self.wait_for_completion_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Same as [`wait_for_completion`](Self::wait_for_completion), but the
    /// sleep between polls also ends when `cancel` fires
    pub async fn wait_for_completion_with_cancel(
        &self,
        request: PollRequest,
        cancel: &CancellationToken,
    ) -> Result<Job> {
        let PollRequest {
            job_id,
            timeout,
            interval,
        } = request;

        let started = Instant::now();
        let mut polls: u32 = 0;

        // The first fetch always happens, even with a zero timeout
        loop {
            let job = self.get_job_status(&job_id).await?;
            polls += 1;

            let status = job.status().clone();
            match status {
                JobStatus::Completed => {
                    info!(job_id = %job_id, polls, elapsed_ms = started.elapsed().as_millis() as u64, "Job completed");
                    return Ok(job);
                }
                JobStatus::Failed => {
                    let message = job
                        .error()
                        .filter(|e| !e.is_empty())
                        .unwrap_or(UNKNOWN_JOB_ERROR)
                        .to_string();
                    warn!(job_id = %job_id, polls, error = %message, "Job failed");
                    return Err(ClientError::JobFailed(message));
                }
                _ => {
                    debug!(job_id = %job_id, polls, %status, "Job not finished yet");
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(job_id = %job_id, polls, "Wait for completion cancelled");
                    return Err(ClientError::Cancelled { last_status: status });
                }
                _ = tokio::time::sleep(interval) => {}
            }

            if started.elapsed() >= timeout {
                warn!(job_id = %job_id, polls, last_status = %status, "Timed out waiting for job");
                return Err(ClientError::Timeout {
                    last_status: status,
                });
            }
        }
    }
}
