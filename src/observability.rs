//! Webhook receiver counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    events_received: AtomicU64,
    events_forwarded: AtomicU64,
    events_dropped: AtomicU64,
    events_rejected: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "events_received", "Metric incremented");
    }

    pub fn event_forwarded(&self) {
        self.events_forwarded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "events_forwarded", "Metric incremented");
    }

    pub fn event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "events_dropped", "Metric incremented");
    }

    /// Malformed payloads and failed deliveries
    pub fn event_rejected(&self) {
        self.events_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "events_rejected", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_forwarded: self.events_forwarded.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub events_received: u64,
    pub events_forwarded: u64,
    pub events_dropped: u64,
    pub events_rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = Metrics::new();
        metrics.event_received();
        metrics.event_received();
        metrics.event_forwarded();
        metrics.event_dropped();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                events_received: 2,
                events_forwarded: 1,
                events_dropped: 1,
                events_rejected: 0,
            }
        );
    }
}
