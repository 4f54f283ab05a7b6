//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{DatabasePool, UserRepository, WorkoutRepository, WorkoutSetRepository, ExerciseRepository};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub workouts: WorkoutRepository,
    pub sets: WorkoutSetRepository,
    pub exercises: ExerciseRepository,
    pool: DatabasePool,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            workouts: WorkoutRepository::new(pool.clone()),
            sets: WorkoutSetRepository::new(pool.clone()),
            exercises: ExerciseRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Check that the database answers
    pub async fn health_check(&self) -> bool {
        match super::connection::health_check(&self.pool).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                false
            }
        }
    }
}
