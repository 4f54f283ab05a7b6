//! Mock LINE Messaging API server for testing
//!
//! Wraps a wiremock server exposing the reply and profile endpoints.

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use logbook::config::LineConfig;

pub const TEST_ACCESS_TOKEN: &str = "test-access-token";
pub const TEST_CHANNEL_SECRET: &str = "test-channel-secret";

/// Mock LINE API server
pub struct LineMockServer {
    pub server: MockServer,
}

impl LineMockServer {
    pub async fn new() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Channel configuration pointing at this server
    pub fn line_config(&self) -> LineConfig {
        LineConfig {
            channel_secret: TEST_CHANNEL_SECRET.to_string(),
            channel_access_token: TEST_ACCESS_TOKEN.to_string(),
            api_base_url: self.server.uri(),
        }
    }

    /// Reply endpoint answering with `status`
    pub async fn mock_reply(&self, status: u16) {
        let body = if status == 200 { json!({}) } else { json!({"message": "Invalid reply token"}) };
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .and(header("authorization", format!("Bearer {}", TEST_ACCESS_TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Profile endpoint for one user
    pub async fn mock_profile(&self, line_user_id: &str, profile: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/bot/profile/{}", line_user_id)))
            .and(header("authorization", format!("Bearer {}", TEST_ACCESS_TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every reply request received so far
    pub async fn reply_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == "/v2/bot/message/reply")
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }
}
