//! Decides whether an inbound webhook payload reaches the subscriber.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Event the subscriber listens for
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `job_completed` with status `completed`
    #[default]
    Completed,
    /// `job_completed` with status `failed`
    Failed,
    #[value(name = "batch_completed")]
    BatchCompleted,
    Progress,
    All,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Completed => "completed",
            EventKind::Failed => "failed",
            EventKind::BatchCompleted => "batch_completed",
            EventKind::Progress => "progress",
            EventKind::All => "all",
        }
    }

    fn matches(&self, event_type: &str, status: &str) -> bool {
        match self {
            EventKind::Completed => event_type == "job_completed" && status == "completed",
            EventKind::Failed => event_type == "job_completed" && status == "failed",
            EventKind::BatchCompleted => event_type == "batch_completed",
            EventKind::Progress => event_type == "progress",
            EventKind::All => true,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" => Ok(EventKind::Completed),
            "failed" => Ok(EventKind::Failed),
            "batch_completed" => Ok(EventKind::BatchCompleted),
            "progress" => Ok(EventKind::Progress),
            "all" => Ok(EventKind::All),
            other => Err(format!("unknown event kind: {}", other)),
        }
    }
}

/// Event kind plus optional exact-match ID filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subscription {
    pub event: EventKind,
    pub job_id: Option<String>,
    pub batch_id: Option<String>,
}

/// Why a payload was not forwarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    EventMismatch { event_type: String, status: String },
    JobIdMismatch,
    BatchIdMismatch,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::EventMismatch { event_type, status } => {
                write!(f, "event mismatch (type '{}', status '{}')", event_type, status)
            }
            DropReason::JobIdMismatch => f.write_str("job_id filter mismatch"),
            DropReason::BatchIdMismatch => f.write_str("batch_id filter mismatch"),
        }
    }
}

/// Routing outcome; a drop is a normal result, not an error
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    Forward(Value),
    Dropped(DropReason),
}

impl Subscription {
    pub fn new(event: EventKind) -> Self {
        Self {
            event,
            ..Default::default()
        }
    }

    /// Blank filters count as unset
    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into()).filter(|id: &String| !id.is_empty());
        self
    }

    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into()).filter(|id: &String| !id.is_empty());
        self
    }

    /// Check every gate without consuming the payload
    pub fn check(&self, payload: &Value) -> Result<(), DropReason> {
        let event_type = lowercase_field(payload, "type");
        let status = lowercase_field(payload, "status");

        if !self.event.matches(&event_type, &status) {
            return Err(DropReason::EventMismatch { event_type, status });
        }

        if !filter_matches(self.job_id.as_deref(), payload, "job_id") {
            return Err(DropReason::JobIdMismatch);
        }

        if !filter_matches(self.batch_id.as_deref(), payload, "batch_id") {
            return Err(DropReason::BatchIdMismatch);
        }

        Ok(())
    }

    /// Forward the payload untouched if it passes, otherwise say why not
    pub fn route(&self, payload: Value) -> Routed {
        match self.check(&payload) {
            Ok(()) => Routed::Forward(payload),
            Err(reason) => Routed::Dropped(reason),
        }
    }
}

/// Missing or non-string fields read as ""
fn lowercase_field(payload: &Value, key: &str) -> String {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .unwrap_or_default()
}

fn filter_matches(filter: Option<&str>, payload: &Value, key: &str) -> bool {
    match filter.filter(|f| !f.is_empty()) {
        Some(expected) => payload.get(key).and_then(Value::as_str) == Some(expected),
        None => true,
    }
}
