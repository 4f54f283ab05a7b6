//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod exercise;
pub mod user;
pub mod workout;
pub mod workout_set;

// Re-export repositories
pub use exercise::ExerciseRepository;
pub use user::UserRepository;
pub use workout::WorkoutRepository;
pub use workout_set::WorkoutSetRepository;

use uuid::Uuid;
use crate::utils::errors::{LogbookError, Result};

/// Parse an identifier that arrived as text
pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| LogbookError::InvalidInput(format!("{} is not a valid id: {}", what, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&format!(" {} ", id), "workout id").unwrap(), id);
        assert_matches!(parse_uuid("ex-123", "exercise id"), Err(LogbookError::InvalidInput(msg)) if msg.contains("exercise id"));
    }
}
