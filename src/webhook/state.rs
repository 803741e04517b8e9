use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::router::Subscription;
use super::sink::EventSink;
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub subscription: Arc<Subscription>,
    pub sink: Arc<dyn EventSink>,
    pub metrics: Arc<Metrics>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(subscription: Subscription, sink: Arc<dyn EventSink>) -> Self {
        Self {
            subscription: Arc::new(subscription),
            sink,
            metrics: Arc::new(Metrics::new()),
            started_at: Utc::now(),
        }
    }
}
