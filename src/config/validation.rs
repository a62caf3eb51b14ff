use crate::config::types::{
    Config, GlobalConfig, OutputConfig, PlatformConfig, StrategyKind, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_global_config(&config.global)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;

    for (name, platform) in &config.platforms {
        validate_platform_config(name, platform)?;
    }

    Ok(())
}

/// Validates the process-wide defaults
fn validate_global_config(config: &GlobalConfig) -> Result<(), ConfigError> {
    if !config.rate_limit.is_finite() || config.rate_limit < 0.0 {
        return Err(ConfigError::Validation(format!(
            "rate-limit must be a non-negative number, got {}",
            config.rate_limit
        )));
    }

    if !config.retry_delay.is_finite() || config.retry_delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "retry-delay must be a non-negative number, got {}",
            config.retry_delay
        )));
    }

    if config.default_timeout == 0 {
        return Err(ConfigError::Validation(
            "default-timeout must be >= 1 second".to_string(),
        ));
    }

    if config.batch_size == 0 {
        return Err(ConfigError::Validation(
            "batch-size must be >= 1".to_string(),
        ));
    }

    if config.max_items == 0 {
        return Err(ConfigError::Validation("max-items must be >= 1".to_string()));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate indexer name: non-empty, alphanumeric + hyphens only
    if config.indexer_name.is_empty() {
        return Err(ConfigError::Validation(
            "indexer-name cannot be empty".to_string(),
        ));
    }

    if !config
        .indexer_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "indexer-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.indexer_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a single platform entry
fn validate_platform_config(name: &str, platform: &PlatformConfig) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "platform name cannot be empty".to_string(),
        ));
    }

    if let Some(rate) = platform.rate_limit {
        if !rate.is_finite() || rate < 0.0 {
            return Err(ConfigError::Validation(format!(
                "Platform '{}': rate-limit must be a non-negative number, got {}",
                name, rate
            )));
        }
    }

    if let Some(timeout) = platform.timeout {
        if timeout == 0 {
            return Err(ConfigError::Validation(format!(
                "Platform '{}': timeout must be >= 1 second",
                name
            )));
        }
    }

    if platform.batch_size == Some(0) {
        return Err(ConfigError::Validation(format!(
            "Platform '{}': batch-size must be >= 1",
            name
        )));
    }

    if platform.max_items == Some(0) {
        return Err(ConfigError::Validation(format!(
            "Platform '{}': max-items must be >= 1",
            name
        )));
    }

    match platform.strategy {
        StrategyKind::Coordinates => {
            let scenes_url = platform.scenes_url.as_deref().ok_or_else(|| {
                ConfigError::Validation(format!(
                    "Platform '{}': coordinates strategy requires scenes-url",
                    name
                ))
            })?;
            validate_endpoint(name, "scenes-url", scenes_url)?;
        }
        StrategyKind::Sitemap => {
            let sitemap_url = platform.sitemap_url.as_deref().ok_or_else(|| {
                ConfigError::Validation(format!(
                    "Platform '{}': sitemap strategy requires sitemap-url",
                    name
                ))
            })?;
            validate_endpoint(name, "sitemap-url", sitemap_url)?;
        }
    }

    Ok(())
}

/// Validates an endpoint URL
///
/// Both HTTP and HTTPS are accepted so that tests can point at local mock
/// servers.
fn validate_endpoint(platform: &str, field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| {
        ConfigError::InvalidUrl(format!("Platform '{}': invalid {}: {}", platform, field, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Platform '{}': {} must use http or https, got '{}'",
            platform,
            field,
            url.scheme()
        )));
    }

    Ok(())
}

/// Basic email validation: must contain exactly one @ with non-empty parts
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();

    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid contact-email: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn valid_config() -> Config {
        Config {
            global: GlobalConfig::default(),
            user_agent: UserAgentConfig {
                indexer_name: "TestIndexer".to_string(),
                indexer_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            output: OutputConfig {
                database_path: "./test.db".to_string(),
            },
            platforms: BTreeMap::new(),
        }
    }

    fn sitemap_platform() -> PlatformConfig {
        PlatformConfig {
            enabled: true,
            strategy: StrategyKind::Sitemap,
            rate_limit: None,
            daily_limit: None,
            cache_duration: None,
            timeout: None,
            batch_size: None,
            batch_delay: None,
            max_items: None,
            scenes_url: None,
            center_x: 0,
            center_y: 0,
            sitemap_url: Some("https://example.com/sitemap.xml".to_string()),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_empty_indexer_name_rejected() {
        let mut config = valid_config();
        config.user_agent.indexer_name = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_indexer_name_with_spaces_rejected() {
        let mut config = valid_config();
        config.user_agent.indexer_name = "Test Indexer".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_contact_email_rejected() {
        let mut config = valid_config();
        config.user_agent.contact_email = "not-an-email".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let mut config = valid_config();
        config.output.database_path = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_sitemap_platform_requires_url() {
        let mut config = valid_config();
        let mut platform = sitemap_platform();
        platform.sitemap_url = None;
        config.platforms.insert("tableverse".to_string(), platform);

        let result = validate(&config);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_coordinates_platform_requires_scenes_url() {
        let mut config = valid_config();
        let mut platform = sitemap_platform();
        platform.strategy = StrategyKind::Coordinates;
        platform.scenes_url = None;
        config.platforms.insert("gridverse".to_string(), platform);

        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_negative_rate_limit_rejected() {
        let mut config = valid_config();
        let mut platform = sitemap_platform();
        platform.rate_limit = Some(-1.0);
        config.platforms.insert("tableverse".to_string(), platform);

        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let mut config = valid_config();
        let mut platform = sitemap_platform();
        platform.sitemap_url = Some("ftp://example.com/sitemap.xml".to_string());
        config.platforms.insert("tableverse".to_string(), platform);

        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_rate_limit_allowed() {
        // Zero disables rate limiting and is a valid configuration
        let mut config = valid_config();
        let mut platform = sitemap_platform();
        platform.rate_limit = Some(0.0);
        config.platforms.insert("tableverse".to_string(), platform);

        assert!(validate(&config).is_ok());
    }
}
