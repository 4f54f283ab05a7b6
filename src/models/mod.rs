//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod exercise;
pub mod line_event;
pub mod user;
pub mod workout;
pub mod workout_set;

// Re-export commonly used models
pub use exercise::Exercise;
pub use line_event::{InboundEvent, InboundKind, WebhookEvent, WebhookPayload};
pub use user::{User, LineProfile, EnsureUserRequest};
pub use workout::{Workout, WorkoutSource};
pub use workout_set::{WorkoutSet, AddSetRequest};
