//! Wire models for the Tornado jobs API.
//!
//! Responses hold the JSON object the service returned and serialize back to
//! it untouched, key spelling and status case included. The few values the
//! client reasons about (ids, status) are read out on deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Remote job status
///
/// Known statuses are parsed case-insensitively; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    /// `Completed` and `Failed` never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Processing => "Processing",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
            JobStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Other(value),
        }
    }
}

impl From<JobStatus> for String {
    fn from(value: JobStatus) -> Self {
        match value {
            JobStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for JobStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(JobStatus::from(s.to_string()))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a remote job as returned by `GET /jobs/{id}`
///
/// Serializes back to the exact object the service sent; `id` and `status`
/// are read out once for the client's own decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Job {
    id: String,
    status: JobStatus,
    raw: Map<String, Value>,
}

impl Job {
    /// Job id, from `id` or `job_id`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    /// Failure message, if the service sent a non-null one
    pub fn error(&self) -> Option<&str> {
        self.raw.get("error").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.raw
    }
}

impl TryFrom<Map<String, Value>> for Job {
    type Error = String;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let status = string_field(&raw, &["status"])
            .map(|s| JobStatus::from(s.to_string()))
            .ok_or("job snapshot has no string `status`")?;
        let id = string_field(&raw, &["id", "job_id"])
            .unwrap_or_default()
            .to_string();
        Ok(Self { id, status, raw })
    }
}

impl From<Job> for Map<String, Value> {
    fn from(job: Job) -> Self {
        job.raw
    }
}

/// Response to `POST /jobs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct JobHandle {
    job_id: String,
    status: Option<JobStatus>,
    raw: Map<String, Value>,
}

impl JobHandle {
    /// New job id, from `job_id` or `id`
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn status(&self) -> Option<&JobStatus> {
        self.status.as_ref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }
}

impl TryFrom<Map<String, Value>> for JobHandle {
    type Error = String;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let job_id = string_field(&raw, &["job_id", "id"])
            .ok_or("create response has no `job_id`")?
            .to_string();
        let status = string_field(&raw, &["status"]).map(|s| JobStatus::from(s.to_string()));
        Ok(Self { job_id, status, raw })
    }
}

impl From<JobHandle> for Map<String, Value> {
    fn from(handle: JobHandle) -> Self {
        handle.raw
    }
}

/// Response to `POST /jobs/bulk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct BatchHandle {
    batch_id: String,
    job_ids: Vec<String>,
    raw: Map<String, Value>,
}

impl BatchHandle {
    /// Batch id, from `batch_id` or `id`
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// Ids of the created jobs, empty when the service does not list them
    pub fn job_ids(&self) -> &[String] {
        &self.job_ids
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }
}

impl TryFrom<Map<String, Value>> for BatchHandle {
    type Error = String;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let batch_id = string_field(&raw, &["batch_id", "id"])
            .ok_or("bulk response has no `batch_id`")?
            .to_string();
        let job_ids = match raw.get("job_ids") {
            Some(Value::Array(ids)) => ids
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        Ok(Self { batch_id, job_ids, raw })
    }
}

impl From<BatchHandle> for Map<String, Value> {
    fn from(handle: BatchHandle) -> Self {
        handle.raw
    }
}

/// Response to `GET /batch/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct BatchStatus {
    batch_id: String,
    status: Option<JobStatus>,
    jobs: Vec<Job>,
    raw: Map<String, Value>,
}

impl BatchStatus {
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn status(&self) -> Option<&JobStatus> {
        self.status.as_ref()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// A batch is done once every member job is terminal
    pub fn is_terminal(&self) -> bool {
        if !self.jobs.is_empty() {
            return self.jobs.iter().all(|job| job.status().is_terminal());
        }

        self.status.as_ref().is_some_and(JobStatus::is_terminal)
    }
}

impl TryFrom<Map<String, Value>> for BatchStatus {
    type Error = String;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let batch_id = string_field(&raw, &["batch_id", "id"])
            .unwrap_or_default()
            .to_string();
        let status = string_field(&raw, &["status"]).map(|s| JobStatus::from(s.to_string()));
        let jobs = match raw.get("jobs") {
            Some(jobs @ Value::Array(_)) => {
                Vec::<Job>::deserialize(jobs).map_err(|e| format!("batch jobs: {}", e))?
            }
            _ => Vec::new(),
        };
        Ok(Self {
            batch_id,
            status,
            jobs,
            raw,
        })
    }
}

impl From<BatchStatus> for Map<String, Value> {
    fn from(batch: BatchStatus) -> Self {
        batch.raw
    }
}

/// First of `keys` holding a string
fn string_field<'a>(raw: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| raw.get(*key).and_then(Value::as_str))
}

/// `GET /jobs` answers either with a bare array or an envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum JobList {
    Bare(Vec<Job>),
    Envelope { jobs: Vec<Job> },
}

impl From<JobList> for Vec<Job> {
    fn from(value: JobList) -> Self {
        match value {
            JobList::Bare(jobs) | JobList::Envelope { jobs } => jobs,
        }
    }
}

/// Query filters for `GET /jobs`; unset fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

impl JobListFilter {
    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset.filter(|offset| *offset > 0) {
            query.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(status) = &self.status {
            query.push(("status".to_string(), status.to_string()));
        }
        query
    }
}

/// One entry of a bulk create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItem {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl BulkItem {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// S3-compatible storage provider (informational, not sent to the service)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    Aws,
    R2,
    Minio,
    Other,
}

/// Body of `POST /user/bucket`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    #[serde(skip_serializing, default)]
    pub provider: StorageProvider,
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}
