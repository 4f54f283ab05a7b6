//! State management module
//!
//! This module handles per-user conversation state, its storage and the
//! dialogue state machine.

pub mod conversation;
pub mod locks;
pub mod machine;
pub mod storage;

// Re-export commonly used state components
pub use conversation::{CompletedEntry, ConversationState, Field, Pending, Phase};
pub use locks::UserLocks;
pub use machine::{transition, Effect, Facts, Intent, Prompt, Transition, WizardRules};
pub use storage::{InMemoryStore, KeyValueStore, RedisStore, StateStorage};
