//! Runs a list of API operations the way a workflow step does: one item at a
//! time, either stopping at the first error or recording it and moving on.
//!
//! Operations are plain JSON so they can come from a file or another tool:
//!
//! ```json
//! [
//!   {"operation": "create_job", "url": "https://youtu.be/abc", "options": {"format": "mkv"}},
//!   {"operation": "wait_for_completion", "job_id": "…", "timeout": "5m"},
//!   {"operation": "get_usage"}
//! ]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::{
    BucketConfig, BulkItem, ClientError, JobListFilter, JobOptions, PollRequest, Result, TornadoClient,
    Transport,
};
use crate::config::{HumanDuration, PollConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    CreateJob {
        url: String,
        #[serde(default)]
        options: JobOptions,
    },
    CreateBulkJobs {
        items: Vec<BulkItem>,
        #[serde(default)]
        options: JobOptions,
    },
    GetJobStatus {
        job_id: String,
    },
    WaitForCompletion {
        job_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<HumanDuration>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<HumanDuration>,
    },
    ListJobs {
        #[serde(default)]
        filter: JobListFilter,
    },
    CancelJob {
        job_id: String,
    },
    RetryJob {
        job_id: String,
    },
    DeleteJobFile {
        job_id: String,
    },
    GetMetadata {
        url: String,
    },
    GetBatchStatus {
        batch_id: String,
    },
    ConfigureBucket {
        storage: BucketConfig,
    },
    ResetBucket,
    GetUsage,
    GetDashboard {
        section: String,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateJob { .. } => "create_job",
            Operation::CreateBulkJobs { .. } => "create_bulk_jobs",
            Operation::GetJobStatus { .. } => "get_job_status",
            Operation::WaitForCompletion { .. } => "wait_for_completion",
            Operation::ListJobs { .. } => "list_jobs",
            Operation::CancelJob { .. } => "cancel_job",
            Operation::RetryJob { .. } => "retry_job",
            Operation::DeleteJobFile { .. } => "delete_job_file",
            Operation::GetMetadata { .. } => "get_metadata",
            Operation::GetBatchStatus { .. } => "get_batch_status",
            Operation::ConfigureBucket { .. } => "configure_bucket",
            Operation::ResetBucket => "reset_bucket",
            Operation::GetUsage => "get_usage",
            Operation::GetDashboard { .. } => "get_dashboard",
        }
    }
}

pub struct Executor<T> {
    client: TornadoClient<T>,
    poll: PollConfig,
    continue_on_fail: bool,
}

impl<T: Transport> Executor<T> {
    pub fn new(client: TornadoClient<T>, poll: PollConfig) -> Self {
        Self {
            client,
            poll,
            continue_on_fail: false,
        }
    }

    /// Record per-item failures as `{"error": message}` instead of aborting
    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    pub fn client(&self) -> &TornadoClient<T> {
        &self.client
    }

    /// Run one operation and return its JSON result
    pub async fn execute(&self, operation: Operation, cancel: &CancellationToken) -> Result<Value> {
        let client = &self.client;
        let value = match operation {
            Operation::CreateJob { url, options } => to_value(client.create_job(&url, &options).await?)?,
            Operation::CreateBulkJobs { items, options } => {
                to_value(client.create_bulk_jobs(&items, &options).await?)?
            }
            Operation::GetJobStatus { job_id } => to_value(client.get_job_status(&job_id).await?)?,
            Operation::WaitForCompletion {
                job_id,
                timeout,
                interval,
            } => {
                let request = PollRequest::new(
                    job_id,
                    timeout.unwrap_or(self.poll.timeout).as_duration(),
                    interval.unwrap_or(self.poll.interval).as_duration(),
                );
                to_value(client.wait_for_completion_with_cancel(request, cancel).await?)?
            }
            Operation::ListJobs { filter } => to_value(client.list_jobs(&filter).await?)?,
            Operation::CancelJob { job_id } => client.cancel_job(&job_id).await?,
            Operation::RetryJob { job_id } => client.retry_job(&job_id).await?,
            Operation::DeleteJobFile { job_id } => client.delete_job_file(&job_id).await?,
            Operation::GetMetadata { url } => client.get_metadata(&url).await?,
            Operation::GetBatchStatus { batch_id } => to_value(client.get_batch_status(&batch_id).await?)?,
            Operation::ConfigureBucket { storage } => client.configure_bucket(&storage).await?,
            Operation::ResetBucket => client.reset_bucket().await?,
            Operation::GetUsage => client.get_usage().await?,
            Operation::GetDashboard { section } => client.get_dashboard(&section).await?,
        };
        Ok(value)
    }

    /// Run operations in order, one result per item
    ///
    /// A fired `cancel` token ends the run even with continue-on-fail set.
    pub async fn execute_items(
        &self,
        operations: Vec<Operation>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Value>> {
        let mut results = Vec::with_capacity(operations.len());

        for (index, operation) in operations.into_iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(index, completed = results.len(), "Run cancelled");
                return Err(ClientError::Interrupted { next_item: index });
            }

            let name = operation.name();
            match self.execute(operation, cancel).await {
                Ok(value) => {
                    info!(index, operation = name, "Item succeeded");
                    results.push(value);
                }
                // Continue-on-fail covers item failures, never the caller's cancel
                Err(err) if err.is_cancellation() => {
                    warn!(index, operation = name, error = %err, "Run cancelled");
                    return Err(err);
                }
                Err(err) if self.continue_on_fail => {
                    warn!(index, operation = name, error = %err, "Item failed, continuing");
                    results.push(json!({ "error": err.to_string() }));
                }
                Err(err) => {
                    warn!(index, operation = name, error = %err, "Item failed");
                    return Err(err);
                }
            }
        }

        Ok(results)
    }
}

fn to_value<S: Serialize>(value: S) -> Result<Value> {
    serde_json::to_value(value).map_err(ClientError::from)
}
