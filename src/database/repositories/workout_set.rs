//! Workout set repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::workout_set::WorkoutSet;
use crate::utils::errors::LogbookError;

#[derive(Clone)]
#[derive(Debug)]
pub struct WorkoutSetRepository {
    pool: PgPool,
}

impl WorkoutSetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a set to an open workout owned by `user_id`.
    ///
    /// Ownership, the open check, the exercise check and set numbering run in
    /// one transaction; the workout row is locked so concurrent adds get
    /// distinct indexes.
    pub async fn add(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        exercise_id: Uuid,
        reps: i32,
        weight_kg: f64,
    ) -> Result<WorkoutSet, LogbookError> {
        let mut tx = self.pool.begin().await?;

        let workout: Option<(Uuid, Option<chrono::DateTime<Utc>>)> = sqlx::query_as(
            "SELECT user_id, ended_at FROM workouts WHERE id = $1 FOR UPDATE"
        )
        .bind(workout_id)
        .fetch_optional(&mut *tx)
        .await?;

        match workout {
            Some((owner, _)) if owner != user_id => {
                return Err(LogbookError::WorkoutNotFound { workout_id: workout_id.to_string() });
            }
            Some((_, Some(_))) => {
                return Err(LogbookError::WorkoutClosed { workout_id: workout_id.to_string() });
            }
            Some((_, None)) => {}
            None => return Err(LogbookError::WorkoutNotFound { workout_id: workout_id.to_string() }),
        }

        let exercise_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM exercises WHERE id = $1)")
            .bind(exercise_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exercise_exists {
            return Err(LogbookError::ExerciseNotFound { exercise_id: exercise_id.to_string() });
        }

        let next_index: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(set_index), 0) + 1 FROM workout_sets WHERE workout_id = $1"
        )
        .bind(workout_id)
        .fetch_one(&mut *tx)
        .await?;

        let now = Utc::now();
        let set = sqlx::query_as::<_, WorkoutSet>(
            r#"
            INSERT INTO workout_sets (workout_id, exercise_id, set_index, reps, weight_kg, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, workout_id, exercise_id, set_index, reps, weight_kg, created_at, updated_at
            "#
        )
        .bind(workout_id)
        .bind(exercise_id)
        .bind(next_index)
        .bind(reps)
        .bind(weight_kg)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(set)
    }

    /// Sets of a workout in recording order
    pub async fn list_by_workout(&self, workout_id: Uuid) -> Result<Vec<WorkoutSet>, LogbookError> {
        let sets = sqlx::query_as::<_, WorkoutSet>(
            r#"
            SELECT id, workout_id, exercise_id, set_index, reps, weight_kg, created_at, updated_at
            FROM workout_sets
            WHERE workout_id = $1
            ORDER BY set_index
            "#
        )
        .bind(workout_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sets)
    }
}
