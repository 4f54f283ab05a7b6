//! Workout domain service
//!
//! String-id facade over the workout, set and exercise repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, debug};

use crate::database::repositories::{parse_uuid, ExerciseRepository, WorkoutRepository, WorkoutSetRepository};
use crate::models::workout::WorkoutSource;
use crate::models::workout_set::AddSetRequest;
use crate::utils::errors::{LogbookError, Result};
use super::{ExerciseLookup, SetService, WorkoutService};

#[derive(Clone)]
#[derive(Debug)]
pub struct WorkoutLogService {
    workouts: WorkoutRepository,
    sets: WorkoutSetRepository,
    exercises: ExerciseRepository,
}

impl WorkoutLogService {
    pub fn new(workouts: WorkoutRepository, sets: WorkoutSetRepository, exercises: ExerciseRepository) -> Self {
        Self { workouts, sets, exercises }
    }
}

#[async_trait]
impl WorkoutService for WorkoutLogService {
    async fn create_workout(&self, user_id: &str, started_at: DateTime<Utc>, source: WorkoutSource) -> Result<String> {
        let user_id = parse_uuid(user_id, "user id")?;
        let workout = self.workouts.create(user_id, started_at, source).await?;
        info!(workout_id = %workout.id, user_id = %user_id, "Workout started");
        Ok(workout.id.to_string())
    }

    async fn end_workout(&self, workout_id: &str, user_id: &str, ended_at: DateTime<Utc>) -> Result<()> {
        let workout_id = parse_uuid(workout_id, "workout id")
            .map_err(|_| LogbookError::WorkoutNotFound { workout_id: workout_id.to_string() })?;
        let user_id = parse_uuid(user_id, "user id")?;
        let workout = self.workouts.end(workout_id, user_id, ended_at).await?;
        info!(workout_id = %workout.id, user_id = %user_id, "Workout ended");
        Ok(())
    }

    async fn latest_open_workout_id(&self, user_id: &str, source: WorkoutSource) -> Result<Option<String>> {
        let user_id = parse_uuid(user_id, "user id")?;
        let workout = self.workouts.find_latest_open(user_id, source).await?;
        debug!(user_id = %user_id, found = workout.is_some(), "Latest open workout lookup");
        Ok(workout.map(|w| w.id.to_string()))
    }
}

#[async_trait]
impl SetService for WorkoutLogService {
    async fn add_set(&self, request: AddSetRequest) -> Result<String> {
        let user_id = parse_uuid(&request.user_id, "user id")?;
        let workout_id = parse_uuid(&request.workout_id, "workout id")
            .map_err(|_| LogbookError::WorkoutNotFound { workout_id: request.workout_id.clone() })?;
        let exercise_id = parse_uuid(&request.exercise_id, "exercise id")
            .map_err(|_| LogbookError::ExerciseNotFound { exercise_id: request.exercise_id.clone() })?;
        let reps = i32::try_from(request.reps)
            .map_err(|_| LogbookError::InvalidInput(format!("reps out of range: {}", request.reps)))?;

        let set = self.sets.add(user_id, workout_id, exercise_id, reps, request.weight_kg).await?;
        info!(workout_id = %workout_id, set_id = %set.id, set_index = set.set_index, "Set recorded");
        Ok(set.id.to_string())
    }
}

#[async_trait]
impl ExerciseLookup for WorkoutLogService {
    async fn exercise_exists(&self, exercise_id: &str) -> Result<bool> {
        self.exercises.exists(exercise_id).await
    }
}
