use thiserror::Error;

use super::models::JobStatus;

/// Placeholder used when a failed job carries no error message
pub const UNKNOWN_JOB_ERROR: &str = "Unknown error";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Timeout waiting for job completion. Last status: {last_status}")]
    Timeout { last_status: JobStatus },

    #[error("Cancelled while waiting for job completion. Last status: {last_status}")]
    Cancelled { last_status: JobStatus },

    #[error("Cancelled before item {next_item} started")]
    Interrupted { next_item: usize },
}

impl ClientError {
    /// Raised by the caller's cancellation token rather than by the remote job
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ClientError::Cancelled { .. } | ClientError::Interrupted { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
