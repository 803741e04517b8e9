use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Poll interval must be positive")]
    ZeroPollInterval,

    #[error("Webhook path must start with '/': {path}")]
    InvalidWebhookPath { path: String },

    #[error("{field} filter must not be blank")]
    BlankFilter { field: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_api(config)?;
    validate_poll(config)?;
    validate_webhook(config)?;
    Ok(())
}

fn validate_api(config: &Config) -> Result<(), ValidationError> {
    let url = reqwest::Url::parse(&config.api.base_url).map_err(|e| {
        ValidationError::InvalidBaseUrl {
            url: config.api.base_url.clone(),
            reason: e.to_string(),
        }
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::InvalidBaseUrl {
            url: config.api.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(())
}

/// The timeout may be zero (one status fetch still happens), the interval may not
fn validate_poll(config: &Config) -> Result<(), ValidationError> {
    if config.poll.interval.is_zero() {
        return Err(ValidationError::ZeroPollInterval);
    }

    Ok(())
}

fn validate_webhook(config: &Config) -> Result<(), ValidationError> {
    if !config.webhook.path.starts_with('/') {
        return Err(ValidationError::InvalidWebhookPath {
            path: config.webhook.path.clone(),
        });
    }

    for (field, value) in [
        ("job_id", &config.webhook.job_id),
        ("batch_id", &config.webhook.batch_id),
    ] {
        if matches!(value, Some(v) if v.trim().is_empty()) {
            return Err(ValidationError::BlankFilter {
                field: field.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::HumanDuration;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_unsupported_scheme() {
        let mut config = Config::default();
        config.api.base_url = "ftp://tornado.example".to_string();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_zero_poll_interval() {
        let mut config = Config::default();
        config.poll.interval = HumanDuration::from_secs(0);

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroPollInterval)));
    }

    #[test]
    fn test_zero_poll_timeout_allowed() {
        let mut config = Config::default();
        config.poll.timeout = HumanDuration::from_secs(0);

        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_webhook_path_must_be_absolute() {
        let mut config = Config::default();
        config.webhook.path = "webhook".to_string();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::InvalidWebhookPath { .. })));
    }

    #[test]
    fn test_blank_filter_rejected() {
        let mut config = Config::default();
        config.webhook.job_id = Some("  ".to_string());

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::BlankFilter { field }) if field == "job_id"
        ));
    }
}
