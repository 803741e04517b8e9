//! Downstream destinations for forwarded webhook payloads

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, mpsc};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Sink closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, SinkError>;

/// Receives every payload the router lets through
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, payload: Value) -> Result<()>;
}

/// Writes one JSON document per line to stdout
#[derive(Debug, Default)]
pub struct StdoutSink {
    stdout: Mutex<Option<tokio::io::Stdout>>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventSink for StdoutSink {
    async fn deliver(&self, payload: Value) -> Result<()> {
        let mut line = serde_json::to_vec(&payload)
            .map_err(|e| SinkError::DeliveryFailed(e.to_string()))?;
        line.push(b'\n');

        // Lines from concurrent deliveries must not interleave
        let mut guard = self.stdout.lock().await;
        let stdout = guard.get_or_insert_with(tokio::io::stdout);
        stdout
            .write_all(&line)
            .await
            .map_err(|e| SinkError::DeliveryFailed(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| SinkError::DeliveryFailed(e.to_string()))
    }
}

/// Hands payloads to an in-process consumer
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<Value>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<Value>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn deliver(&self, payload: Value) -> Result<()> {
        self.sender.send(payload).await.map_err(|_| SinkError::Closed)
    }
}
