use crate::config::types::{Config, FinderConfig, HttpConfig, OutputConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Shortest idle monitor period accepted (milliseconds)
const MIN_IDLE_CHECK_INTERVAL: u64 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_finder_config(&config.finder)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the crawl engine configuration
pub(crate) fn validate_finder_config(config: &FinderConfig) -> ConfigResult<()> {
    if config.max_pages == 0 {
        return Err(ConfigError::NonPositive("max_pages"));
    }

    if config.max_workers == 0 {
        return Err(ConfigError::NonPositive("max_workers"));
    }

    // A pool larger than the budget could never keep every worker busy
    if config.max_workers > config.max_pages {
        return Err(ConfigError::WorkersExceedPages {
            workers: config.max_workers,
            pages: config.max_pages,
        });
    }

    if config.idle_check_interval < MIN_IDLE_CHECK_INTERVAL {
        return Err(ConfigError::Validation(format!(
            "idle_check_interval must be >= {}ms, got {}ms",
            MIN_IDLE_CHECK_INTERVAL, config.idle_check_interval
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates HTTP transport configuration
fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    if config.request_timeout == 0 {
        return Err(ConfigError::NonPositive("request_timeout"));
    }

    if config.connect_timeout == 0 {
        return Err(ConfigError::NonPositive("connect_timeout"));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if matches!(&config.summary_path, Some(path) if path.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
