//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{LogbookError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_line_config(&settings.line)?;
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_wizard_config(&settings.wizard)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate LINE channel configuration
fn validate_line_config(config: &super::LineConfig) -> Result<()> {
    if config.channel_secret.is_empty() {
        return Err(LogbookError::Config(
            "LINE channel secret is required".to_string()
        ));
    }

    if config.channel_access_token.is_empty() {
        return Err(LogbookError::Config(
            "LINE channel access token is required".to_string()
        ));
    }

    url::Url::parse(&config.api_base_url)?;

    Ok(())
}

/// Validate webhook server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.bind_address.parse::<std::net::SocketAddr>().is_err() {
        return Err(LogbookError::Config(
            format!("Invalid bind address: {}", config.bind_address)
        ));
    }

    if !config.webhook_path.starts_with('/') {
        return Err(LogbookError::Config(
            "Webhook path must start with '/'".to_string()
        ));
    }

    if config.webhook_path == "/health" {
        return Err(LogbookError::Config(
            "Webhook path cannot be /health".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(LogbookError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(LogbookError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(LogbookError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(LogbookError::Config(
            "Redis URL is required".to_string()
        ));
    }

    if config.ttl_seconds == 0 {
        return Err(LogbookError::Config(
            "Conversation TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate dialogue rules
fn validate_wizard_config(config: &super::WizardConfig) -> Result<()> {
    if config.min_exercise_id_len == 0 {
        return Err(LogbookError::Config(
            "Minimum exercise id length must be at least 1".to_string()
        ));
    }

    if config.min_exercise_id_len > config.max_exercise_id_len {
        return Err(LogbookError::Config(
            "Minimum exercise id length cannot exceed the maximum".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(LogbookError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(LogbookError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.line.channel_secret = "secret".to_string();
        settings.line.channel_access_token = "token".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_channel_secret_is_rejected() {
        let mut settings = valid_settings();
        settings.line.channel_secret.clear();
        assert_matches!(validate_settings(&settings), Err(LogbookError::Config(_)));
    }

    #[test]
    fn test_bad_api_url_is_rejected() {
        let mut settings = valid_settings();
        settings.line.api_base_url = "not a url".to_string();
        let err = validate_settings(&settings).unwrap_err();
        assert_matches!(err, LogbookError::UrlParse(_));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_webhook_path_must_be_distinct() {
        let mut settings = valid_settings();
        settings.server.webhook_path = "/health".to_string();
        assert_matches!(validate_settings(&settings), Err(LogbookError::Config(_)));

        settings.server.webhook_path = "line/webhook".to_string();
        assert_matches!(validate_settings(&settings), Err(LogbookError::Config(_)));
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let mut settings = valid_settings();
        settings.redis.ttl_seconds = 0;
        assert_matches!(validate_settings(&settings), Err(LogbookError::Config(_)));
    }

    #[test]
    fn test_inverted_exercise_bounds_are_rejected() {
        let mut settings = valid_settings();
        settings.wizard.min_exercise_id_len = 10;
        settings.wizard.max_exercise_id_len = 4;
        assert_matches!(validate_settings(&settings), Err(LogbookError::Config(_)));
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert_matches!(validate_settings(&settings), Err(LogbookError::Config(_)));
    }
}
