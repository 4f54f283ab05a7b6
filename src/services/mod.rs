//! Services module
//!
//! Domain operations the dialogue depends on, expressed as traits so the
//! dialogue can run against the database or against in-memory fakes.

pub mod line;
pub mod user;
pub mod workout;

// Re-export commonly used services
pub use line::LineClient;
pub use user::UserService;
pub use workout::WorkoutLogService;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::database::DatabaseService;
use crate::models::workout::WorkoutSource;
use crate::models::workout_set::AddSetRequest;
use crate::utils::errors::Result;

#[async_trait]
pub trait WorkoutService: Send + Sync {
    /// Open a workout and return its id
    async fn create_workout(&self, user_id: &str, started_at: DateTime<Utc>, source: WorkoutSource) -> Result<String>;

    async fn end_workout(&self, workout_id: &str, user_id: &str, ended_at: DateTime<Utc>) -> Result<()>;

    async fn latest_open_workout_id(&self, user_id: &str, source: WorkoutSource) -> Result<Option<String>>;
}

#[async_trait]
pub trait SetService: Send + Sync {
    /// Record one set and return its id
    async fn add_set(&self, request: AddSetRequest) -> Result<String>;
}

#[async_trait]
pub trait ExerciseLookup: Send + Sync {
    async fn exercise_exists(&self, exercise_id: &str) -> Result<bool>;
}

/// Maps an external chat identity to the internal user id
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_user(&self, line_user_id: &str) -> Result<String>;
}

/// Delivers reply messages for a reply token
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(&self, reply_token: &str, messages: Vec<Value>) -> Result<()>;
}

/// Service factory holding every collaborator of the dialogue
#[derive(Clone)]
pub struct ServiceFactory {
    pub workouts: Arc<dyn WorkoutService>,
    pub sets: Arc<dyn SetService>,
    pub exercises: Arc<dyn ExerciseLookup>,
    pub identity: Arc<dyn IdentityResolver>,
    pub replies: Arc<dyn ReplySender>,
}

impl ServiceFactory {
    /// Wire the production services
    pub fn new(database: &DatabaseService, line_client: LineClient) -> Self {
        let log_service = Arc::new(WorkoutLogService::new(
            database.workouts.clone(),
            database.sets.clone(),
            database.exercises.clone(),
        ));
        let user_service = Arc::new(UserService::new(database.users.clone(), line_client.clone()));

        Self {
            workouts: log_service.clone(),
            sets: log_service.clone(),
            exercises: log_service,
            identity: user_service,
            replies: Arc::new(line_client),
        }
    }
}
