//! Tornado jobs API client
//!
//! [`TornadoClient`] turns typed requests into [`ApiRequest`]s and hands them
//! to a [`Transport`]. Remote failures propagate unchanged; the only errors
//! the client synthesizes itself come from
//! [`wait_for_completion`](TornadoClient::wait_for_completion).
//!
//! ```no_run
//! # async fn demo() -> Result<(), tornado::client::ClientError> {
//! use std::time::Duration;
//! use tornado::client::{HttpConfig, HttpTransport, JobOptions, PollRequest, TornadoClient};
//!
//! let transport = HttpTransport::new("https://tornado.velys.software", "sk_live", HttpConfig::default())?;
//! let client = TornadoClient::new(transport);
//!
//! let handle = client
//!     .create_job("https://www.youtube.com/watch?v=abc", &JobOptions::default())
//!     .await?;
//! let job = client
//!     .wait_for_completion(PollRequest::new(handle.job_id(), Duration::from_secs(600), Duration::from_secs(5)))
//!     .await?;
//! println!("{}", job.status());
//! # Ok(())
//! # }
//! ```

mod error;
mod http;
mod models;
mod options;
mod poll;
mod transport;

pub use error::{ClientError, Result, UNKNOWN_JOB_ERROR};
pub use http::{HttpConfig, HttpTransport};
pub use models::{
    BatchHandle, BatchStatus, BucketConfig, BulkItem, Job, JobHandle, JobListFilter, JobStatus,
    StorageProvider,
};
pub use options::{
    AudioBitrate, AudioCodec, Format, JobOptions, MAX_VIDEO_QUALITY, MaxResolution, QualityPreset,
    VideoCodec,
};
pub use poll::PollRequest;
pub use transport::{ApiRequest, Method, Transport};

use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::info;

use models::JobList;

/// Largest bulk request the service accepts
pub const MAX_BULK_ITEMS: usize = 100;

#[derive(Serialize)]
struct CreateJobPayload<'a> {
    url: &'a str,
    #[serde(flatten)]
    options: &'a JobOptions,
}

#[derive(Clone)]
pub struct TornadoClient<T> {
    transport: T,
}

impl<T: Transport> TornadoClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let value = self.transport.call(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Create a download job (`POST /jobs`)
    pub async fn create_job(&self, url: &str, options: &JobOptions) -> Result<JobHandle> {
        let body = create_payload(url, options)?;
        let handle: JobHandle = self.call(ApiRequest::post("/jobs").with_body(body)).await?;
        info!(job_id = %handle.job_id(), url, "Job created");
        Ok(handle)
    }

    /// Create one job per item sharing the same options (`POST /jobs/bulk`)
    pub async fn create_bulk_jobs(&self, items: &[BulkItem], shared: &JobOptions) -> Result<BatchHandle> {
        let body = bulk_payload(items, shared)?;
        let handle: BatchHandle = self.call(ApiRequest::post("/jobs/bulk").with_body(body)).await?;
        info!(batch_id = %handle.batch_id(), items = items.len(), "Bulk jobs created");
        Ok(handle)
    }

    /// Single status fetch (`GET /jobs/{id}`)
    pub async fn get_job_status(&self, job_id: &str) -> Result<Job> {
        self.call(ApiRequest::get(job_path(job_id, None)?)).await
    }

    /// `GET /jobs` with only the filters that are set
    pub async fn list_jobs(&self, filter: &JobListFilter) -> Result<Vec<Job>> {
        let list: JobList = self
            .call(ApiRequest::get("/jobs").with_query(filter.to_query()))
            .await?;
        Ok(list.into())
    }

    /// `DELETE /jobs/{id}`
    pub async fn cancel_job(&self, job_id: &str) -> Result<Value> {
        let response = self.transport.call(ApiRequest::delete(job_path(job_id, None)?)).await?;
        info!(job_id, "Job cancelled");
        Ok(response)
    }

    /// `POST /jobs/{id}/retry`
    pub async fn retry_job(&self, job_id: &str) -> Result<Value> {
        let path = job_path(job_id, Some("retry"))?;
        let response = self.transport.call(ApiRequest::post(path)).await?;
        info!(job_id, "Job retry requested");
        Ok(response)
    }

    /// `DELETE /jobs/{id}/file`
    pub async fn delete_job_file(&self, job_id: &str) -> Result<Value> {
        let path = job_path(job_id, Some("file"))?;
        self.transport.call(ApiRequest::delete(path)).await
    }

    /// `POST /metadata`
    pub async fn get_metadata(&self, url: &str) -> Result<Value> {
        require("url", url)?;
        self.transport
            .call(ApiRequest::post("/metadata").with_body(json!({ "url": url })))
            .await
    }

    /// `GET /batch/{id}`
    pub async fn get_batch_status(&self, batch_id: &str) -> Result<BatchStatus> {
        require("batch_id", batch_id)?;
        self.call(ApiRequest::get(api_path(&["batch", batch_id])?)).await
    }

    /// Point uploads at the caller's own bucket (`POST /user/bucket`)
    pub async fn configure_bucket(&self, bucket: &BucketConfig) -> Result<Value> {
        for (field, value) in [
            ("endpoint", &bucket.endpoint),
            ("bucket", &bucket.bucket),
            ("region", &bucket.region),
            ("access_key", &bucket.access_key),
            ("secret_key", &bucket.secret_key),
        ] {
            require(field, value)?;
        }

        let response = self
            .transport
            .call(ApiRequest::post("/user/bucket").with_body(serde_json::to_value(bucket)?))
            .await?;
        info!(bucket = %bucket.bucket, "Storage bucket configured");
        Ok(response)
    }

    /// Back to the service's default storage (`DELETE /user/bucket`)
    pub async fn reset_bucket(&self) -> Result<Value> {
        self.transport.call(ApiRequest::delete("/user/bucket")).await
    }

    /// `GET /usage`
    pub async fn get_usage(&self) -> Result<Value> {
        self.transport.call(ApiRequest::get("/usage")).await
    }

    /// `GET /dashboard/{section}`
    pub async fn get_dashboard(&self, section: &str) -> Result<Value> {
        require("section", section)?;
        self.transport
            .call(ApiRequest::get(api_path(&["dashboard", section])?))
            .await
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// `/jobs/{id}` plus an optional action segment
fn job_path(job_id: &str, action: Option<&str>) -> Result<String> {
    require("job_id", job_id)?;
    match action {
        Some(action) => api_path(&["jobs", job_id, action]),
        None => api_path(&["jobs", job_id]),
    }
}

/// Absolute API path; each segment is percent-encoded on its own so an id
/// can never add segments or a query string
fn api_path(segments: &[&str]) -> Result<String> {
    if let Some(dots) = segments.iter().find(|s| matches!(**s, "." | "..")) {
        return Err(ClientError::Validation(format!("invalid path segment '{}'", dots)));
    }

    let mut url = Url::parse("http://tornado.invalid/")
        .map_err(|e| ClientError::Validation(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::Validation("cannot build API path".into()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.path().to_string())
}

fn create_payload(url: &str, options: &JobOptions) -> Result<Value> {
    require("url", url)?;
    options.validate()?;
    Ok(serde_json::to_value(CreateJobPayload {
        url: url.trim(),
        options,
    })?)
}

fn bulk_payload(items: &[BulkItem], shared: &JobOptions) -> Result<Value> {
    if items.is_empty() || items.len() > MAX_BULK_ITEMS {
        return Err(ClientError::Validation(format!(
            "bulk requests need between 1 and {} items, got {}",
            MAX_BULK_ITEMS,
            items.len()
        )));
    }

    let jobs = items
        .iter()
        .map(|item| {
            let mut options = shared.clone();
            if item.filename.as_deref().is_some_and(|f| !f.is_empty()) {
                options.filename = item.filename.clone();
            }
            create_payload(&item.url, &options)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({ "jobs": jobs }))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory transport for unit tests

    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<Value>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub fn new(responses: impl IntoIterator<Item = Result<Value>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn call(&self, request: ApiRequest) -> Result<Value> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("ScriptedTransport ran out of responses"))
        }
    }
}
