use crate::config::types::{Config, FetchConfig, OutputConfig, SearchConfig};
use crate::ConfigError;

/// Delay the archive's terms of service ask for between requests (milliseconds)
const RECOMMENDED_POLITENESS_DELAY: u64 = 5000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates search configuration
///
/// The URL itself is deliberately left unchecked: any listing URL the user
/// copies out of a browser is accepted as-is.
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.url.trim().is_empty() {
        return Err(ConfigError::Validation("url cannot be empty".to_string()));
    }

    if config.start_page < 1 {
        return Err(ConfigError::Validation(format!(
            "start_page must be >= 1, got {}",
            config.start_page
        )));
    }

    if let Some(tag) = config.tags.iter().find(|t| t.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "tags cannot contain blank entries, got '{}'",
            tag
        )));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(
            "user_agent cannot contain control characters".to_string(),
        ));
    }

    if config.politeness_delay < RECOMMENDED_POLITENESS_DELAY {
        tracing::warn!(
            "politeness_delay of {}ms is below the recommended {}ms",
            config.politeness_delay,
            RECOMMENDED_POLITENESS_DELAY
        );
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation("name cannot be empty".to_string()));
    }

    if config.name.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "name must not contain path separators, got '{}'",
            config.name
        )));
    }

    Ok(())
}
