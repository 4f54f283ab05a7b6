//! Dialogue state machine
//!
//! A pure transition function over [`ConversationState`]. It never talks to
//! storage or the domain services; the orchestrator gathers the facts it needs
//! up front and carries out the requested [`Effect`] afterwards.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use thiserror::Error;

use crate::config::WizardConfig;
use super::conversation::{CompletedEntry, ConversationState, Field, Phase};

/// What the user asked for, after command resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    End,
    AddEntry,
    Cancel,
    /// Jump back to a field of the running entry
    Revisit(Field),
    ProvideField(String),
    Unknown,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Start => "start",
            Intent::End => "end",
            Intent::AddEntry => "add_entry",
            Intent::Cancel => "cancel",
            Intent::Revisit(_) => "revisit",
            Intent::ProvideField(_) => "provide_field",
            Intent::Unknown => "unknown",
        }
    }
}

/// Results of lookups performed before the transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facts {
    /// Latest open workout created through chat, if it was looked up
    pub open_workout_id: Option<String>,
    /// Whether the submitted exercise id exists; `None` when not checked
    pub exercise_known: Option<bool>,
}

/// Domain call requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CreateWorkout,
    EndWorkout { workout_id: String },
    CommitSet(CompletedEntry),
}

/// Message to show the user after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Welcome,
    RegistrationFailed,
    Guide,
    WorkoutStarted,
    WorkoutEnded,
    NothingToEnd,
    StartFirst,
    AddFirst,
    Ask(Field),
    InvalidExercise,
    UnknownExercise,
    InvalidWeight,
    InvalidReps,
    SetRecorded,
    CommitFailed,
    Cancelled,
    NothingToCancel,
    TryAgain,
}

impl Prompt {
    /// Re-prompt for a phase
    pub fn for_phase(phase: Phase) -> Self {
        match phase.expected_field() {
            Some(field) => Prompt::Ask(field),
            None => Prompt::Guide,
        }
    }
}

/// Outcome of one transition
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: ConversationState,
    pub effect: Option<Effect>,
    pub prompt: Prompt,
    /// `false` when `next` equals the input state and nothing needs writing
    pub changed: bool,
}

impl Transition {
    fn unchanged(state: &ConversationState, prompt: Prompt) -> Self {
        Self { next: state.clone(), effect: None, prompt, changed: false }
    }

    fn changed(next: ConversationState, prompt: Prompt) -> Self {
        Self { next, effect: None, prompt, changed: true }
    }
}

/// Input validation rules for the collected fields
#[derive(Debug, Clone)]
pub struct WizardRules {
    pub min_exercise_id_len: usize,
    pub max_exercise_id_len: usize,
}

impl Default for WizardRules {
    fn default() -> Self {
        Self { min_exercise_id_len: 3, max_exercise_id_len: 64 }
    }
}

impl From<&WizardConfig> for WizardRules {
    fn from(config: &WizardConfig) -> Self {
        Self {
            min_exercise_id_len: config.min_exercise_id_len,
            max_exercise_id_len: config.max_exercise_id_len,
        }
    }
}

/// Rejected field input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("exercise id must be {min}-{max} characters of letters, digits, '.', '_', ':' or '-'")]
    ExerciseId { min: usize, max: usize },
    #[error("weight must be a number of at least 0")]
    Weight,
    #[error("reps must be a positive integer")]
    Reps,
}

fn exercise_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._:\-]*$").expect("static pattern compiles"))
}

/// Validate an exercise identifier
pub fn parse_exercise_id(text: &str, rules: &WizardRules) -> Result<String, FieldError> {
    let id = text.trim();
    let len = id.chars().count();
    let error = FieldError::ExerciseId {
        min: rules.min_exercise_id_len,
        max: rules.max_exercise_id_len,
    };

    if len < rules.min_exercise_id_len || len > rules.max_exercise_id_len {
        return Err(error);
    }
    if !exercise_id_pattern().is_match(id) {
        return Err(error);
    }
    Ok(id.to_string())
}

/// Parse a weight in kilograms
pub fn parse_weight(text: &str) -> Result<f64, FieldError> {
    let weight: f64 = text.trim().parse().map_err(|_| FieldError::Weight)?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(FieldError::Weight);
    }
    Ok(weight)
}

/// Parse a repetition count
pub fn parse_reps(text: &str) -> Result<u32, FieldError> {
    match text.trim().parse::<u32>() {
        Ok(reps) if reps > 0 => Ok(reps),
        _ => Err(FieldError::Reps),
    }
}

/// Compute the next state for `intent`
pub fn transition(
    state: &ConversationState,
    intent: &Intent,
    facts: &Facts,
    rules: &WizardRules,
    now: DateTime<Utc>,
) -> Transition {
    match intent {
        Intent::Start => Transition {
            next: state.clone(),
            effect: Some(Effect::CreateWorkout),
            prompt: Prompt::WorkoutStarted,
            changed: false,
        },

        Intent::End => {
            let target = state.workout_id.clone().or_else(|| facts.open_workout_id.clone());
            match target {
                Some(workout_id) => Transition {
                    next: ConversationState::idle(now),
                    effect: Some(Effect::EndWorkout { workout_id }),
                    prompt: Prompt::WorkoutEnded,
                    changed: !state.is_idle(),
                },
                None => Transition::unchanged(state, Prompt::NothingToEnd),
            }
        }

        Intent::AddEntry => match &facts.open_workout_id {
            Some(workout_id) => {
                Transition::changed(ConversationState::begin(workout_id.clone(), now), Prompt::Ask(Field::Exercise))
            }
            // the running entry's workout is gone, so the entry goes too
            None if !state.is_idle() => Transition::changed(ConversationState::idle(now), Prompt::StartFirst),
            None => Transition::unchanged(state, Prompt::StartFirst),
        },

        Intent::Cancel => {
            if state.is_idle() {
                Transition::unchanged(state, Prompt::NothingToCancel)
            } else {
                Transition::changed(ConversationState::idle(now), Prompt::Cancelled)
            }
        }

        Intent::Revisit(field) => {
            if state.is_idle() {
                return Transition::unchanged(state, Prompt::AddFirst);
            }
            if !state.can_revisit(*field) || state.phase == field.phase() {
                return Transition::unchanged(state, Prompt::for_phase(state.phase));
            }
            let mut next = state.clone();
            next.phase = field.phase();
            next.touch(now);
            Transition::changed(next, Prompt::Ask(*field))
        }

        Intent::ProvideField(text) => match state.phase.expected_field() {
            Some(field) => accept_field(state, field, text, facts, rules, now),
            None => Transition::unchanged(state, Prompt::for_phase(state.phase)),
        },

        Intent::Unknown => Transition::unchanged(state, Prompt::for_phase(state.phase)),
    }
}

fn accept_field(
    state: &ConversationState,
    field: Field,
    text: &str,
    facts: &Facts,
    rules: &WizardRules,
    now: DateTime<Utc>,
) -> Transition {
    let mut next = state.clone();

    match field {
        Field::Exercise => {
            let Ok(exercise_id) = parse_exercise_id(text, rules) else {
                return Transition::unchanged(state, Prompt::InvalidExercise);
            };
            if facts.exercise_known == Some(false) {
                return Transition::unchanged(state, Prompt::UnknownExercise);
            }
            next.pending.exercise_id = Some(exercise_id);
        }
        Field::Weight => {
            let Ok(weight) = parse_weight(text) else {
                return Transition::unchanged(state, Prompt::InvalidWeight);
            };
            next.pending.weight = Some(weight);
        }
        Field::Reps => {
            let Ok(reps) = parse_reps(text) else {
                return Transition::unchanged(state, Prompt::InvalidReps);
            };
            next.pending.reps = Some(reps);
        }
    }

    next.phase = next.next_missing_phase();
    next.touch(now);

    match (next.phase, next.completed_entry()) {
        (Phase::ReadyToCommit, Some(entry)) => Transition {
            next,
            effect: Some(Effect::CommitSet(entry)),
            prompt: Prompt::SetRecorded,
            changed: true,
        },
        (Phase::ReadyToCommit, None) => Transition::changed(ConversationState::idle(now), Prompt::AddFirst),
        (phase, _) => Transition::changed(next, Prompt::for_phase(phase)),
    }
}
