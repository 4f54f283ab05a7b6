//! LINE webhook endpoint
//!
//! Verifies the delivery signature, splits the delivery into per-user event
//! queues and runs them through the dialogue. Users are processed
//! concurrently; one user's events keep their delivery order.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::future::join_all;
use serde_json::json;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, info, warn, Level};

use crate::middleware::signature::{verify_signature, SIGNATURE_HEADER};
use crate::models::line_event::{InboundEvent, WebhookPayload};
use crate::services::ReplySender;
use crate::utils::logging::log_api_error;
use super::dialogue::DialogueOrchestrator;

/// Shared state of the webhook router
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<DialogueOrchestrator>,
    pub replies: Arc<dyn ReplySender>,
    pub channel_secret: Arc<str>,
}

impl AppState {
    pub fn new(orchestrator: Arc<DialogueOrchestrator>, replies: Arc<dyn ReplySender>, channel_secret: &str) -> Self {
        Self {
            orchestrator,
            replies,
            channel_secret: Arc::from(channel_secret),
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(handle_webhook))
        .route("/health", get(health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn handle_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|value| value.to_str().ok());
    if let Err(e) = verify_signature(&state.channel_secret, &body, signature) {
        warn!(error = %e, "Rejected webhook delivery");
        return StatusCode::UNAUTHORIZED;
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Malformed webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    let received = payload.events.len();
    let events = payload.into_inbound_events();
    info!(received = received, handled = events.len(), "Webhook delivery accepted");

    let queues = group_by_user(events);
    join_all(queues.into_iter().map(|queue| process_queue(&state, queue))).await;

    StatusCode::OK
}

/// Events of one user, in delivery order
fn group_by_user(events: Vec<InboundEvent>) -> Vec<Vec<InboundEvent>> {
    let mut queues: Vec<Vec<InboundEvent>> = Vec::new();
    for event in events {
        match queues.iter_mut().find(|queue| queue[0].line_user_id == event.line_user_id) {
            Some(queue) => queue.push(event),
            None => queues.push(vec![event]),
        }
    }
    queues
}

async fn process_queue(state: &AppState, queue: Vec<InboundEvent>) {
    for event in queue {
        let reply = state.orchestrator.handle_event(&event).await;

        let Some(reply_token) = event.reply_token.as_deref() else {
            debug!(line_user_id = %event.line_user_id, "Event has no reply token, reply dropped");
            continue;
        };
        if let Err(e) = state.replies.send_reply(reply_token, reply.to_line_messages()).await {
            log_api_error("line_reply", &e, Some(event.line_user_id.as_str()));
        }
    }
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let store_ok = state.orchestrator.storage().health_check().await;
    let status = if store_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(json!({
            "status": if store_ok { "ok" } else { "degraded" },
            "store": store_ok,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_user_keeps_order() {
        let events = vec![
            InboundEvent::text("U1", "開始"),
            InboundEvent::text("U2", "追加"),
            InboundEvent::text("U1", "追加"),
            InboundEvent::text("U1", "ex-123"),
        ];

        let queues = group_by_user(events);
        assert_eq!(queues.len(), 2);

        let first: Vec<_> = queues[0].iter().map(|e| e.kind.clone()).collect();
        assert_eq!(first, vec![
            InboundEvent::text("U1", "開始").kind,
            InboundEvent::text("U1", "追加").kind,
            InboundEvent::text("U1", "ex-123").kind,
        ]);
        assert_eq!(queues[1][0].line_user_id, "U2");
    }
}
