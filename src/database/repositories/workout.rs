//! Workout repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::workout::{Workout, WorkoutSource};
use crate::utils::errors::LogbookError;

const WORKOUT_COLUMNS: &str = "id, user_id, started_at, ended_at, note, is_from_line, created_at, updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct WorkoutRepository {
    pool: PgPool,
}

impl WorkoutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new open workout
    pub async fn create(&self, user_id: Uuid, started_at: DateTime<Utc>, source: WorkoutSource) -> Result<Workout, LogbookError> {
        let workout = sqlx::query_as::<_, Workout>(&format!(
            r#"
            INSERT INTO workouts (user_id, started_at, is_from_line, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING {}
            "#,
            WORKOUT_COLUMNS
        ))
        .bind(user_id)
        .bind(started_at)
        .bind(source.is_from_line())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(workout)
    }

    /// Find workout by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Workout>, LogbookError> {
        let workout = sqlx::query_as::<_, Workout>(&format!("SELECT {} FROM workouts WHERE id = $1", WORKOUT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(workout)
    }

    /// Close an open workout owned by `user_id`.
    ///
    /// Fails with `WorkoutNotFound` when the workout does not exist or belongs
    /// to someone else, and with `WorkoutClosed` when it has already ended.
    pub async fn end(&self, id: Uuid, user_id: Uuid, ended_at: DateTime<Utc>) -> Result<Workout, LogbookError> {
        let updated = sqlx::query_as::<_, Workout>(&format!(
            r#"
            UPDATE workouts
            SET ended_at = $3, updated_at = $4
            WHERE id = $1 AND user_id = $2 AND ended_at IS NULL
            RETURNING {}
            "#,
            WORKOUT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(ended_at)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(workout) = updated {
            return Ok(workout);
        }

        match self.find_by_id(id).await? {
            Some(workout) if workout.user_id == user_id => Err(LogbookError::WorkoutClosed { workout_id: id.to_string() }),
            _ => Err(LogbookError::WorkoutNotFound { workout_id: id.to_string() }),
        }
    }

    /// Most recently started open workout of a user created through `source`
    pub async fn find_latest_open(&self, user_id: Uuid, source: WorkoutSource) -> Result<Option<Workout>, LogbookError> {
        let workout = sqlx::query_as::<_, Workout>(&format!(
            r#"
            SELECT {}
            FROM workouts
            WHERE user_id = $1 AND ended_at IS NULL AND is_from_line = $2
            ORDER BY started_at DESC
            LIMIT 1
            "#,
            WORKOUT_COLUMNS
        ))
        .bind(user_id)
        .bind(source.is_from_line())
        .fetch_optional(&self.pool)
        .await?;

        Ok(workout)
    }
}
