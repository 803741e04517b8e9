//! Inbound webhooks from the Tornado service
//!
//! - [`Subscription`] / [`Routed`] - pure pass/drop decision for one payload
//! - [`EventSink`] - where forwarded payloads go
//! - [`build_router`] / [`run`] - axum receiver that ties the two together

mod error;
mod router;
mod server;
pub mod services;
pub mod sink;
pub mod state;

pub use error::{ErrorResponse, WebhookError};
pub use router::{DropReason, EventKind, Routed, Subscription};
pub use server::{build_router, run};
pub use sink::{ChannelSink, EventSink, SinkError, StdoutSink};
pub use state::AppState;
