use crate::config::types::{AuthKind, Config, FilterConfig, HttpConfig, JobsConfig, KeywordsConfig};
use crate::keywords::stopwords;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_filter_config(&config.filter)?;
    validate_keywords_config(&config.keywords)?;
    validate_jobs_config(&config.jobs)?;
    Ok(())
}

/// Validates outbound HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 || config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be between 1 and timeout-secs ({}), got {}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates the expected filter host (a bare host name, no scheme or path)
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    let host = &config.expected_host;
    if host.is_empty() {
        return Err(ConfigError::Validation(
            "expected-host cannot be empty".to_string(),
        ));
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':')
    {
        return Err(ConfigError::Validation(format!(
            "expected-host must be a bare host name, got '{}'",
            host
        )));
    }

    Ok(())
}

/// Validates keyword and tag cloud settings
fn validate_keywords_config(config: &KeywordsConfig) -> Result<(), ConfigError> {
    if !stopwords::is_supported(&config.language) {
        return Err(ConfigError::Validation(format!(
            "unsupported language '{}', expected one of: {}",
            config.language,
            stopwords::SUPPORTED_LANGUAGES.join(", ")
        )));
    }

    if config.cloud_max_words == 0 {
        return Err(ConfigError::Validation(
            "cloud-max-words must be >= 1".to_string(),
        ));
    }

    if config.cloud_min_size == 0 || config.cloud_min_size > config.cloud_max_size {
        return Err(ConfigError::Validation(format!(
            "cloud sizes must satisfy 1 <= cloud-min-size <= cloud-max-size, got {}..{}",
            config.cloud_min_size, config.cloud_max_size
        )));
    }

    Ok(())
}

/// Validates the remote job API settings
fn validate_jobs_config(config: &JobsConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.api_base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api-base-url: {}", e)))?;

    if !matches!(base.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(format!(
            "api-base-url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    if config.auth == AuthKind::Header && config.auth_header.trim().is_empty() {
        return Err(ConfigError::Validation(
            "auth-header cannot be empty when auth = \"header\"".to_string(),
        ));
    }

    if config.poll_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "poll-interval-secs must be >= 1".to_string(),
        ));
    }

    if config.poll_interval_secs > config.max_wait_secs {
        return Err(ConfigError::Validation(format!(
            "poll-interval-secs ({}) cannot exceed max-wait-secs ({})",
            config.poll_interval_secs, config.max_wait_secs
        )));
    }

    Ok(())
}
