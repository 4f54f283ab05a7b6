//! User identity service
//!
//! Maps a LINE user id to the internal user id, registering the user on
//! first contact.

use async_trait::async_trait;
use tracing::{info, warn, debug};

use crate::database::repositories::UserRepository;
use crate::models::user::{EnsureUserRequest, LineProfile};
use crate::utils::errors::Result;
use super::{IdentityResolver, line::LineClient};

/// Resolves identities against the users table, enriched with LINE profiles
#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
    line_client: LineClient,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository, line_client: LineClient) -> Self {
        Self {
            user_repository,
            line_client,
        }
    }

    async fn fetch_profile(&self, line_user_id: &str) -> Option<LineProfile> {
        match self.line_client.get_profile(line_user_id).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(line_user_id = %line_user_id, error = %e, "Failed to fetch LINE profile, registering without it");
                None
            }
        }
    }
}

#[async_trait]
impl IdentityResolver for UserService {
    async fn resolve_user(&self, line_user_id: &str) -> Result<String> {
        debug!(line_user_id = %line_user_id, "Resolving user");

        let profile = self.fetch_profile(line_user_id).await;
        let request = EnsureUserRequest {
            line_user_id: line_user_id.to_string(),
            name: profile.as_ref().and_then(|p| p.display_name.clone()),
            picture_url: profile.and_then(|p| p.picture_url),
        };

        let user = self.user_repository.ensure_line_user(request).await?;
        if user.created_at == user.updated_at {
            info!(user_id = %user.id, line_user_id = %line_user_id, "New user registered");
        }

        Ok(user.id.to_string())
    }
}
