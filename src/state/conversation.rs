//! Conversation state record
//!
//! One record per LINE user, tracking the data-entry phase, the workout the
//! entry belongs to and the fields collected so far.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Step of the data-entry dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingExercise,
    AwaitingWeight,
    AwaitingReps,
    ReadyToCommit,
}

impl Phase {
    /// Field the user is asked for in this phase
    pub fn expected_field(self) -> Option<Field> {
        match self {
            Phase::AwaitingExercise => Some(Field::Exercise),
            Phase::AwaitingWeight => Some(Field::Weight),
            Phase::AwaitingReps => Some(Field::Reps),
            Phase::Idle | Phase::ReadyToCommit => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::AwaitingExercise => "awaiting_exercise",
            Phase::AwaitingWeight => "awaiting_weight",
            Phase::AwaitingReps => "awaiting_reps",
            Phase::ReadyToCommit => "ready_to_commit",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field collected by the dialogue, in collection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Exercise,
    Weight,
    Reps,
}

impl Field {
    /// Phase in which this field is collected
    pub fn phase(self) -> Phase {
        match self {
            Field::Exercise => Phase::AwaitingExercise,
            Field::Weight => Phase::AwaitingWeight,
            Field::Reps => Phase::AwaitingReps,
        }
    }
}

/// Fields collected so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pending {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
}

impl Pending {
    pub fn is_empty(&self) -> bool {
        self.exercise_id.is_none() && self.weight.is_none() && self.reps.is_none()
    }

    fn has(&self, field: Field) -> bool {
        match field {
            Field::Exercise => self.exercise_id.is_some(),
            Field::Weight => self.weight.is_some(),
            Field::Reps => self.reps.is_some(),
        }
    }
}

/// Everything needed to record one set
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedEntry {
    pub workout_id: String,
    pub exercise_id: String,
    pub weight_kg: f64,
    pub reps: u32,
}

/// Per-user conversation state as stored in the conversation store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_id: Option<String>,
    #[serde(default)]
    pub pending: Pending,
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    /// State of a user with no stored record
    pub fn idle(now: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::Idle,
            workout_id: None,
            pending: Pending::default(),
            updated_at: now,
        }
    }

    /// Fresh data-entry sequence for an open workout
    pub fn begin(workout_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::AwaitingExercise,
            workout_id: Some(workout_id.into()),
            pending: Pending::default(),
            updated_at: now,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// All four values needed for a set are present
    pub fn is_ready(&self) -> bool {
        self.workout_id.is_some()
            && self.pending.exercise_id.is_some()
            && self.pending.weight.is_some()
            && self.pending.reps.is_some()
    }

    /// Phase that asks for the first missing field, or `ReadyToCommit`
    pub fn next_missing_phase(&self) -> Phase {
        [Field::Exercise, Field::Weight, Field::Reps]
            .into_iter()
            .find(|field| !self.pending.has(*field))
            .map(Field::phase)
            .unwrap_or(Phase::ReadyToCommit)
    }

    /// Whether every field collected before `field` is already present
    pub fn can_revisit(&self, field: Field) -> bool {
        if self.workout_id.is_none() {
            return false;
        }
        match field {
            Field::Exercise => true,
            Field::Weight => self.pending.has(Field::Exercise),
            Field::Reps => self.pending.has(Field::Exercise) && self.pending.has(Field::Weight),
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Logical expiry, independent of the store TTL
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.updated_at > ttl
    }

    pub fn completed_entry(&self) -> Option<CompletedEntry> {
        Some(CompletedEntry {
            workout_id: self.workout_id.clone()?,
            exercise_id: self.pending.exercise_id.clone()?,
            weight_kg: self.pending.weight?,
            reps: self.pending.reps?,
        })
    }

    /// Check that the fields agree with the phase.
    ///
    /// Records that fail this check are treated as corrupt by the storage layer.
    pub fn check_consistency(&self) -> Result<(), String> {
        let ready = self.is_ready();
        match self.phase {
            Phase::Idle => {
                if self.workout_id.is_some() || !self.pending.is_empty() {
                    return Err("idle record carries workout or pending fields".to_string());
                }
            }
            Phase::ReadyToCommit => {
                if !ready {
                    return Err("ready_to_commit record is missing fields".to_string());
                }
            }
            phase => {
                let field = phase.expected_field().unwrap_or(Field::Exercise);
                if ready {
                    return Err(format!("{} record already holds every field", phase));
                }
                if !self.can_revisit(field) {
                    return Err(format!("{} record is missing earlier fields", phase));
                }
                if self.pending.reps.is_some() {
                    return Err(format!("{} record holds reps before commit", phase));
                }
            }
        }
        Ok(())
    }

    /// Serialize to the stored JSON form
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a stored record, returning `None` for anything unusable.
    ///
    /// A complete entry is committed and cleared in the same step, so a stored
    /// `ready_to_commit` record is never valid.
    pub fn decode(raw: &str) -> Option<Self> {
        let state: ConversationState = serde_json::from_str(raw).ok()?;
        if state.phase == Phase::ReadyToCommit {
            return None;
        }
        if let Some(weight) = state.pending.weight {
            if !weight.is_finite() || weight < 0.0 {
                return None;
            }
        }
        if state.pending.reps == Some(0) {
            return None;
        }
        state.check_consistency().ok()?;
        Some(state)
    }
}
