//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub line: LineConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub wizard: WizardConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    pub logging: LoggingConfig,
}

/// LINE Messaging API channel configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineConfig {
    pub channel_secret: String,
    pub channel_access_token: String,
    pub api_base_url: String,
}

/// Webhook server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub webhook_path: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration for conversation state
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Data-entry dialogue rules
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WizardConfig {
    pub min_exercise_id_len: usize,
    pub max_exercise_id_len: usize,
    /// Ask the exercise catalogue before accepting an exercise id
    pub verify_exercise_exists: bool,
    /// Serialize events of the same user inside this process
    pub serialize_per_user: bool,
}

/// Reply menu configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MenuConfig {
    pub flex_menu_path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("LOGBOOK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::LogbookError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            line: LineConfig {
                channel_secret: String::new(),
                channel_access_token: String::new(),
                api_base_url: "https://api.line.me".to_string(),
            },
            server: ServerConfig {
                bind_address: "0.0.0.0:3000".to_string(),
                webhook_path: "/line/webhook".to_string(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/logbook".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "logbook:".to_string(),
                ttl_seconds: 45 * 60,
            },
            wizard: WizardConfig {
                min_exercise_id_len: 3,
                max_exercise_id_len: 64,
                verify_exercise_exists: true,
                serialize_per_user: true,
            },
            menu: MenuConfig {
                flex_menu_path: Some("assets/flex/menu.json".to_string()),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                file_prefix: "logbook.log".to_string(),
                json: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_ttl_is_45_minutes() {
        let settings = Settings::default();
        assert_eq!(settings.redis.ttl_seconds, 2700);
        assert_eq!(settings.redis.prefix, "logbook:");
    }

    #[test]
    fn test_settings_roundtrip_through_config_source() {
        let source = config::Config::try_from(&Settings::default()).unwrap();
        let settings: Settings = source.try_deserialize().unwrap();

        assert_eq!(settings.server.webhook_path, "/line/webhook");
        assert_eq!(settings.wizard.min_exercise_id_len, 3);
        assert_eq!(settings.menu.flex_menu_path.as_deref(), Some("assets/flex/menu.json"));
    }
}
