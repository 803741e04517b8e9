use axum::{Json, extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::error::WebhookError;
use super::router::Routed;
use super::state::AppState;
use crate::observability::MetricsSnapshot;

/// Webhook bodies are small status documents
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
pub struct ForwardedResponse {
    pub delivery_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub event: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub metrics: MetricsSnapshot,
}

/// Inbound webhook endpoint (POST, path from config)
///
/// Every well-formed delivery is acknowledged with 200, whether it was
/// forwarded or filtered out, so the sender never retries a dropped event.
/// Forwarded deliveries get a JSON body with the delivery id; dropped ones
/// get an empty body.
pub async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Body,
) -> Result<axum::response::Response, WebhookError> {
    let delivery_id = Uuid::now_v7().to_string();
    let span = info_span!("webhook", delivery_id = %delivery_id);

    async move {
        state.metrics.event_received();

        let payload = match read_payload(&headers, body).await {
            Ok(payload) => payload,
            Err(err) => {
                state.metrics.event_rejected();
                warn!(error = %err, "Rejected webhook delivery");
                return Err(err);
            }
        };

        match state.subscription.route(payload) {
            Routed::Forward(payload) => {
                let event_type = payload.get("type").and_then(Value::as_str).unwrap_or_default().to_string();
                if let Err(err) = state.sink.deliver(payload).await {
                    state.metrics.event_rejected();
                    return Err(WebhookError::Internal(err.to_string()));
                }
                state.metrics.event_forwarded();
                info!(event_type = %event_type, "Webhook event forwarded");
                Ok((StatusCode::OK, Json(ForwardedResponse { delivery_id })).into_response())
            }
            Routed::Dropped(reason) => {
                state.metrics.event_dropped();
                debug!(%reason, "Webhook event dropped");
                Ok(StatusCode::OK.into_response())
            }
        }
    }
    .instrument(span)
    .await
}

/// Checks the media type, reads at most [`MAX_PAYLOAD_SIZE`] decoded bytes
/// and requires a JSON object
async fn read_payload(headers: &HeaderMap, body: axum::body::Body) -> Result<Value, WebhookError> {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| WebhookError::InvalidPayload("missing Content-Type header".into()))?;
    require_json(content_type)?;

    // Counted after decompression, so a small gzip body cannot expand past the limit
    let data = Limited::new(body, MAX_PAYLOAD_SIZE)
        .collect()
        .await
        .map_err(|err| {
            if err.downcast_ref::<LengthLimitError>().is_some() {
                WebhookError::PayloadTooLarge(MAX_PAYLOAD_SIZE)
            } else {
                WebhookError::InvalidPayload(format!("unreadable body: {}", err))
            }
        })?
        .to_bytes();

    let payload: Value = serde_json::from_slice(&data)?;
    if !payload.is_object() {
        return Err(WebhookError::InvalidPayload("payload must be a JSON object".into()));
    }

    Ok(payload)
}

/// Tornado posts `application/json`, optionally with a charset
fn require_json(content_type: &str) -> Result<(), WebhookError> {
    let media_type: mime::Mime = content_type.parse().map_err(|_| {
        WebhookError::InvalidPayload(format!("invalid Content-Type: {}", content_type))
    })?;

    if media_type.essence_str() != mime::APPLICATION_JSON.essence_str() {
        return Err(WebhookError::InvalidPayload(format!(
            "Content-Type must be application/json, got: {}",
            media_type.essence_str()
        )));
    }

    Ok(())
}

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        event: state.subscription.event.to_string(),
        started_at: state.started_at,
        metrics: state.metrics.snapshot(),
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        headers
    }

    #[test]
    fn test_require_json() {
        assert!(require_json("application/json").is_ok());
        assert!(require_json("application/json; charset=utf-8").is_ok());
        assert!(require_json("Application/JSON").is_ok());

        assert!(require_json("application/jsonp").is_err());
        assert!(require_json("text/json").is_err());
        assert!(require_json("application/x-www-form-urlencoded").is_err());
        assert!(require_json("").is_err());
    }

    #[tokio::test]
    async fn test_read_payload_at_size_limit() {
        // `{"k":"…"}` padded to exactly the limit
        let filler = "a".repeat(MAX_PAYLOAD_SIZE - r#"{"k":""}"#.len());
        let body = format!(r#"{{"k":"{}"}}"#, filler);
        assert_eq!(body.len(), MAX_PAYLOAD_SIZE);

        let payload = read_payload(&json_headers(), axum::body::Body::from(body))
            .await
            .unwrap();
        assert_eq!(payload["k"].as_str().map(str::len), Some(filler.len()));
    }

    #[tokio::test]
    async fn test_read_payload_over_size_limit() {
        let body = format!(r#"{{"k":"{}"}}"#, "a".repeat(MAX_PAYLOAD_SIZE));

        let err = read_payload(&json_headers(), axum::body::Body::from(body))
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::PayloadTooLarge(MAX_PAYLOAD_SIZE)));
    }

    #[tokio::test]
    async fn test_read_payload_requires_content_type() {
        let err = read_payload(&HeaderMap::new(), axum::body::Body::from("{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::InvalidPayload(_)));
    }
}
