//! Webhook handlers module
//!
//! This module contains the LINE webhook pipeline:
//! - Command resolution for postbacks and keywords
//! - The dialogue orchestrator driving the state machine
//! - Reply composition and the HTTP router

pub mod commands;
pub mod dialogue;
pub mod replies;
pub mod webhook;

// Re-export commonly used handler components
pub use commands::resolve_intent;
pub use dialogue::DialogueOrchestrator;
pub use replies::{MenuState, OutboundReply, ReplyComposer};
pub use webhook::{build_router, AppState};
