use crate::config::types::{Config, Credentials, PacingConfig, SourceConfig, TargetConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_source_config(&config.source)?;
    validate_pacing_config(&config.pacing)?;
    if let Some(credentials) = &config.session.credentials {
        validate_credentials(credentials)?;
    }
    Ok(())
}

/// Validates an account handle
///
/// Handles are 1 to 50 characters of ASCII letters, digits, and underscores.
/// A single leading '@' is rejected so that output files are named after the
/// bare handle.
pub fn validate_handle(handle: &str) -> Result<(), ConfigError> {
    if handle.is_empty() {
        return Err(ConfigError::Validation("handle cannot be empty".to_string()));
    }

    if handle.starts_with('@') {
        return Err(ConfigError::Validation(format!(
            "handle must not start with '@', got '{}'",
            handle
        )));
    }

    if handle.len() > 50 {
        return Err(ConfigError::Validation(format!(
            "handle must be at most 50 characters, got {}",
            handle.len()
        )));
    }

    if !handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "handle must contain only ASCII letters, digits, and underscores, got '{}'",
            handle
        )));
    }

    Ok(())
}

fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    // minimum_items <= 0 is legal: the run performs no fetches
    validate_handle(&config.handle)
}

fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.page_size < 1 || config.page_size > 200 {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and 200, got {}",
            config.page_size
        )));
    }

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

    Ok(())
}

fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.min_delay_secs > config.max_delay_secs {
        return Err(ConfigError::Validation(format!(
            "min-delay-secs ({}) must not exceed max-delay-secs ({})",
            config.min_delay_secs, config.max_delay_secs
        )));
    }

    Ok(())
}

fn validate_credentials(credentials: &Credentials) -> Result<(), ConfigError> {
    if credentials.username.is_empty() {
        return Err(ConfigError::Validation(
            "credentials.username cannot be empty".to_string(),
        ));
    }

    if credentials.password.is_empty() {
        return Err(ConfigError::Validation(
            "credentials.password cannot be empty".to_string(),
        ));
    }

    validate_email(&credentials.email)
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    Ok(())
}
