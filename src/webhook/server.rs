use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::decompression::RequestDecompressionLayer;
use tracing::info;

use super::router::Subscription;
use super::services::{health, receive_event};
use super::sink::EventSink;
use super::state::AppState;
use crate::config::WebhookConfig;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

impl From<&WebhookConfig> for Subscription {
    fn from(config: &WebhookConfig) -> Self {
        let mut subscription = Subscription::new(config.event);
        if let Some(job_id) = &config.job_id {
            subscription = subscription.with_job_id(job_id.clone());
        }
        if let Some(batch_id) = &config.batch_id {
            subscription = subscription.with_batch_id(batch_id.clone());
        }
        subscription
    }
}

/// Routes for the webhook receiver
pub fn build_router(path: &str, state: AppState) -> Router {
    Router::new()
        .route(path, post(receive_event))
        .route("/health", get(health))
        .with_state(state)
        // Senders may gzip their bodies
        .layer(RequestDecompressionLayer::new())
}

/// Serve webhooks until Ctrl+C, SIGTERM or `shutdown` fires
pub async fn run(
    config: &WebhookConfig,
    sink: Arc<dyn EventSink>,
    shutdown: CancellationToken,
) -> Result<(), AnyError> {
    let subscription = Subscription::from(config);
    info!(
        event = %subscription.event,
        job_id = subscription.job_id.as_deref().unwrap_or("-"),
        batch_id = subscription.batch_id.as_deref().unwrap_or("-"),
        "Webhook subscription"
    );

    let app = build_router(&config.path, AppState::new(subscription, sink));

    let listener = TcpListener::bind(config.bind_addr).await?;
    let address: SocketAddr = listener.local_addr()?;
    info!(%address, path = %config.path, "Tornado webhook receiver listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = shutdown.cancelled() => {},
    }

    info!("Shutdown signal received");
}
