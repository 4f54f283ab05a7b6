//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::user::{User, EnsureUserRequest};
use crate::utils::errors::LogbookError;

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user or refresh the profile of an existing one.
    ///
    /// Profile fields that are `None` keep their stored value.
    pub async fn ensure_line_user(&self, request: EnsureUserRequest) -> Result<User, LogbookError> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (line_user_id, name, picture_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (line_user_id) DO UPDATE
            SET name = COALESCE(EXCLUDED.name, users.name),
                picture_url = COALESCE(EXCLUDED.picture_url, users.picture_url),
                updated_at = EXCLUDED.updated_at
            RETURNING id, line_user_id, name, picture_url, created_at, updated_at
            "#
        )
        .bind(request.line_user_id)
        .bind(request.name)
        .bind(request.picture_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, LogbookError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, line_user_id, name, picture_url, created_at, updated_at FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by LINE user ID
    pub async fn find_by_line_user_id(&self, line_user_id: &str) -> Result<Option<User>, LogbookError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, line_user_id, name, picture_url, created_at, updated_at FROM users WHERE line_user_id = $1"
        )
        .bind(line_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
