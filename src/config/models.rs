use crate::humanize::HumanDuration;
use crate::webhook::EventKind;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Remote API connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key (loaded from environment, not from config file)
    #[serde(skip)]
    pub api_key: Option<String>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://tornado.velys.software".to_string()
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(60)
}

fn default_user_agent() -> String {
    format!("tornado/{}", env!("CARGO_PKG_VERSION"))
}

/// Defaults for wait-for-completion
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_timeout")]
    pub timeout: HumanDuration,
    #[serde(default = "default_poll_interval")]
    pub interval: HumanDuration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: default_poll_timeout(),
            interval: default_poll_interval(),
        }
    }
}

fn default_poll_timeout() -> HumanDuration {
    HumanDuration::from_secs(600)
}

fn default_poll_interval() -> HumanDuration {
    HumanDuration::from_secs(5)
}

/// Webhook receiver configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default = "default_webhook_path")]
    pub path: String,
    #[serde(default)]
    pub event: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            path: default_webhook_path(),
            event: EventKind::default(),
            job_id: None,
            batch_id: None,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "tornado=info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "https://tornado.velys.software");
        assert!(config.api.api_key.is_none());
        assert_eq!(config.poll.timeout.as_duration(), Duration::from_secs(600));
        assert_eq!(config.poll.interval.as_duration(), Duration::from_secs(5));
        assert_eq!(config.webhook.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.webhook.path, "/webhook");
        assert_eq!(config.webhook.event, EventKind::Completed);
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.api.api_key = Some("sk_secret".to_string());

        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("sk_secret"));
        assert!(rendered.contains("base_url"));
    }
}
