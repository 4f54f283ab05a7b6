//! Exercise repository implementation

use sqlx::PgPool;
use uuid::Uuid;
use crate::models::exercise::Exercise;
use crate::utils::errors::LogbookError;

#[derive(Clone)]
#[derive(Debug)]
pub struct ExerciseRepository {
    pool: PgPool,
}

impl ExerciseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find exercise by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Exercise>, LogbookError> {
        let exercise = sqlx::query_as::<_, Exercise>("SELECT id, name, created_at FROM exercises WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(exercise)
    }

    /// Whether an exercise with this textual id exists; malformed ids never do
    pub async fn exists(&self, raw_id: &str) -> Result<bool, LogbookError> {
        let Ok(id) = Uuid::parse_str(raw_id.trim()) else {
            return Ok(false);
        };
        Ok(self.find_by_id(id).await?.is_some())
    }
}
