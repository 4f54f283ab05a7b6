//! LINE webhook payload and the inbound chat events derived from it

use serde::{Deserialize, Serialize};

/// Body of a LINE webhook delivery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
    #[serde(default)]
    pub postback: Option<EventPostback>,
    #[serde(default)]
    pub webhook_event_id: Option<String>,
    #[serde(default)]
    pub delivery_context: Option<DeliveryContext>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPostback {
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryContext {
    pub is_redelivery: bool,
}

/// What the user did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    Follow,
    /// Any message; `text` is `None` for stickers, images and the like
    Message { text: Option<String> },
    Postback { data: String },
}

/// A chat event the dialogue reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub kind: InboundKind,
    pub line_user_id: String,
    pub reply_token: Option<String>,
    pub webhook_event_id: Option<String>,
    pub is_redelivery: bool,
}

impl InboundEvent {
    pub fn new(kind: InboundKind, line_user_id: impl Into<String>) -> Self {
        Self {
            kind,
            line_user_id: line_user_id.into(),
            reply_token: None,
            webhook_event_id: None,
            is_redelivery: false,
        }
    }

    pub fn text(line_user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(InboundKind::Message { text: Some(text.into()) }, line_user_id)
    }

    pub fn postback(line_user_id: impl Into<String>, data: impl Into<String>) -> Self {
        Self::new(InboundKind::Postback { data: data.into() }, line_user_id)
    }

    pub fn follow(line_user_id: impl Into<String>) -> Self {
        Self::new(InboundKind::Follow, line_user_id)
    }

    pub fn with_reply_token(mut self, reply_token: impl Into<String>) -> Self {
        self.reply_token = Some(reply_token.into());
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            InboundKind::Follow => "follow",
            InboundKind::Message { .. } => "message",
            InboundKind::Postback { .. } => "postback",
        }
    }
}

impl WebhookEvent {
    /// Convert to an [`InboundEvent`].
    ///
    /// Returns `None` for event types the dialogue ignores and for events
    /// without a source user.
    pub fn into_inbound(self) -> Option<InboundEvent> {
        let line_user_id = self.source.and_then(|source| source.user_id)?;

        let kind = match self.event_type.as_str() {
            "follow" => InboundKind::Follow,
            "message" => {
                let text = self
                    .message
                    .filter(|message| message.message_type == "text")
                    .and_then(|message| message.text);
                InboundKind::Message { text }
            }
            "postback" => InboundKind::Postback { data: self.postback?.data },
            _ => return None,
        };

        Some(InboundEvent {
            kind,
            line_user_id,
            reply_token: self.reply_token,
            webhook_event_id: self.webhook_event_id,
            is_redelivery: self.delivery_context.map(|ctx| ctx.is_redelivery).unwrap_or(false),
        })
    }
}

impl WebhookPayload {
    /// Events the dialogue handles, in delivery order
    pub fn into_inbound_events(self) -> Vec<InboundEvent> {
        self.events.into_iter().filter_map(WebhookEvent::into_inbound).collect()
    }
}
