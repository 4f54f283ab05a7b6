//! Error handling for Logbook
//!
//! This module defines the main error type used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the Logbook application
#[derive(Error, Debug)]
pub enum LogbookError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LINE API error ({status}): {body}")]
    LineApi { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Workout not found: {workout_id}")]
    WorkoutNotFound { workout_id: String },

    #[error("Workout already ended: {workout_id}")]
    WorkoutClosed { workout_id: String },

    #[error("Exercise not found: {exercise_id}")]
    ExerciseNotFound { exercise_id: String },

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Result type alias for Logbook operations
pub type Result<T> = std::result::Result<T, LogbookError>;

impl LogbookError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            LogbookError::Database(_) => true,
            LogbookError::Migration(_) => false,
            LogbookError::Redis(_) => true,
            LogbookError::Http(_) => true,
            LogbookError::LineApi { status, .. } => *status >= 500 || *status == 429,
            LogbookError::Serialization(_) => false,
            LogbookError::Io(_) => true,
            LogbookError::UrlParse(_) => false,
            LogbookError::Config(_) => false,
            LogbookError::WorkoutNotFound { .. } => false,
            LogbookError::WorkoutClosed { .. } => false,
            LogbookError::ExerciseNotFound { .. } => false,
            LogbookError::InvalidSignature => false,
            LogbookError::InvalidInput(_) => false,
            LogbookError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LogbookError::Migration(_) => ErrorSeverity::Critical,
            LogbookError::Config(_) => ErrorSeverity::Critical,
            LogbookError::InvalidSignature => ErrorSeverity::Warning,
            LogbookError::WorkoutNotFound { .. } => ErrorSeverity::Warning,
            LogbookError::WorkoutClosed { .. } => ErrorSeverity::Warning,
            LogbookError::ExerciseNotFound { .. } => ErrorSeverity::Warning,
            LogbookError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_api_recoverability() {
        let throttled = LogbookError::LineApi { status: 429, body: String::new() };
        let rejected = LogbookError::LineApi { status: 400, body: "bad token".to_string() };

        assert!(throttled.is_recoverable());
        assert!(!rejected.is_recoverable());
        assert!(!LogbookError::WorkoutClosed { workout_id: "w-1".to_string() }.is_recoverable());
    }

    #[test]
    fn test_domain_errors_are_warnings() {
        let err = LogbookError::WorkoutClosed { workout_id: "w-1".to_string() };
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.to_string(), "Workout already ended: w-1");
    }
}
