//! reqwest-backed [`Transport`]

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::error::{ClientError, Result};
use super::transport::{ApiRequest, Method, Transport};
use crate::config::ApiConfig;

const API_KEY_HEADER: &str = "x-api-key";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            user_agent: format!("tornado/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&ApiConfig> for HttpConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout.as_duration(),
            request_timeout: config.request_timeout.as_duration(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Sends [`ApiRequest`]s to the Tornado API with the API key header attached
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: impl Into<String>, config: HttpConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ClientError::Validation("API key must not be empty".into()));
        }

        // Url::join drops the last segment unless the base ends with a slash
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| ClientError::Validation(format!("invalid base URL '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Validation(format!("invalid path '{}': {}", path, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: ApiRequest) -> Result<Value> {
        let url = self.endpoint(&request.path)?;
        debug!(method = %request.method, %url, "Calling Tornado API");

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Delete => self.client.delete(url),
        }
        .header(API_KEY_HEADER, &self.api_key);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Transport(format!("request timed out: {}", e))
            } else {
                ClientError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to read body: {}", e)))?;

        debug!(method = %request.method, path = %request.path, status = status.as_u16(), "Tornado API responded");

        if !status.is_success() {
            return Err(ClientError::Remote {
                status: status.as_u16(),
                message: error_message(&bytes)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string()),
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Best-effort human message from an error body
fn error_message(body: &[u8]) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(Value::String(message)) = map.get(key) {
                return Some(message.clone());
            }
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.user_agent.starts_with("tornado/"));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let transport =
            HttpTransport::new("https://api.example.com/v1", "sk_test", HttpConfig::default()).unwrap();

        assert_eq!(
            transport.endpoint("/jobs/abc").unwrap().as_str(),
            "https://api.example.com/v1/jobs/abc"
        );
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = HttpTransport::new("https://api.example.com", " ", HttpConfig::default());
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(br#"{"detail": "Job not found"}"#).as_deref(), Some("Job not found"));
        assert_eq!(error_message(br#"{"error": "quota exceeded"}"#).as_deref(), Some("quota exceeded"));
        assert_eq!(error_message(b"Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message(b""), None);
    }
}
