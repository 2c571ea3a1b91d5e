use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound for `max-categories` and `max-items-per-category`
pub const MAX_CAP: usize = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site
fn validate_site_config(config: &SiteConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use HTTP or HTTPS, got '{}'",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    // delay_ms may be zero (tests, local mirrors)

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    for (name, value) in [
        ("max_categories", config.max_categories),
        ("max_items_per_category", config.max_items_per_category),
    ] {
        if !(1..=MAX_CAP).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_CAP, value
            )));
        }
    }

    if config.stop_after_items == Some(0) {
        return Err(ConfigError::Validation(
            "stop_after_items must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }

    if config.value.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(
            "user-agent value cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.root_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "root_dir cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("images_dir", &config.images_dir),
        ("metadata_dir", &config.metadata_dir),
    ] {
        validate_relative_name(name, value)?;
    }

    for (name, value) in [
        ("metadata_file", &config.metadata_file),
        ("checkpoint_file", &config.checkpoint_file),
    ] {
        validate_relative_name(name, value)?;
        if !value.ends_with(".json") {
            return Err(ConfigError::Validation(format!(
                "{} must end with .json, got '{}'",
                name, value
            )));
        }
    }

    Ok(())
}

/// Output entries live under the root directory; reject anything that escapes it
fn validate_relative_name(name: &str, value: &str) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    if value.starts_with('/') || value.split(['/', '\\']).any(|part| part == "..") {
        return Err(ConfigError::Validation(format!(
            "{} must be a relative path inside root_dir, got '{}'",
            name, value
        )));
    }

    Ok(())
}
