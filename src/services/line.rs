//! LINE Messaging API client
//!
//! Sends replies and fetches user profiles. Only the two endpoints the
//! bot needs are covered.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::LineConfig;
use crate::models::user::LineProfile;
use crate::utils::errors::{LogbookError, Result};
use super::ReplySender;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: &'a [Value],
}

/// Client for the LINE Messaging API
#[derive(Clone)]
#[derive(Debug)]
pub struct LineClient {
    client: Client,
    base_url: String,
    channel_access_token: String,
}

impl LineClient {
    /// Create a new LineClient instance
    pub fn new(config: &LineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("logbook/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            channel_access_token: config.channel_access_token.clone(),
        })
    }

    /// Reply to an event using its reply token
    pub async fn reply(&self, reply_token: &str, messages: &[Value]) -> Result<()> {
        let url = format!("{}/v2/bot/message/reply", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.channel_access_token)
            .json(&ReplyRequest { reply_token, messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "LINE reply rejected");
            return Err(LogbookError::LineApi { status: status.as_u16(), body });
        }

        debug!(messages = messages.len(), "LINE reply sent");
        Ok(())
    }

    /// Fetch the public profile of a user who has added the bot
    pub async fn get_profile(&self, line_user_id: &str) -> Result<LineProfile> {
        let url = format!("{}/v2/bot/profile/{}", self.base_url, line_user_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.channel_access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LogbookError::LineApi { status: status.as_u16(), body });
        }

        Ok(response.json::<LineProfile>().await?)
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn send_reply(&self, reply_token: &str, messages: Vec<Value>) -> Result<()> {
        self.reply(reply_token, &messages).await
    }
}
