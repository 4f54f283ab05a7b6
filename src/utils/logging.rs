//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Logbook application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::config::LoggingConfig;
use crate::utils::errors::{LogbookError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop, so the caller keeps it
/// alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LogbookError::Config(format!("Invalid log filter: {}", e)))?;

    let (json_layer, text_layer) = if config.json {
        (Some(fmt::layer().json().with_writer(non_blocking)), None)
    } else {
        (None, Some(fmt::layer().with_ansi(false).with_writer(non_blocking)))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| LogbookError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(line_user_id: &str, action: &str, details: Option<&str>) {
    info!(
        line_user_id = line_user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log a dialogue phase change
pub fn log_phase_change(line_user_id: &str, from: &str, to: &str, intent: &str) {
    debug!(
        line_user_id = line_user_id,
        from = from,
        to = to,
        intent = intent,
        "Dialogue phase changed"
    );
}

/// Log a call into the workout/set services
pub fn log_domain_call(operation: &str, user_id: &str, success: bool, details: Option<&str>) {
    if success {
        info!(
            operation = operation,
            user_id = user_id,
            details = details,
            "Domain operation completed"
        );
    } else {
        warn!(
            operation = operation,
            user_id = user_id,
            details = details,
            "Domain operation failed"
        );
    }
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &LogbookError, context: Option<&str>) {
    error!(
        api = api,
        error = %error,
        recoverable = error.is_recoverable(),
        context = context,
        "API error occurred"
    );
}
