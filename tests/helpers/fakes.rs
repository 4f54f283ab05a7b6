//! In-memory domain fakes
//!
//! One `FakeDomain` plays every collaborator of the dialogue and records
//! what was asked of it.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use logbook::models::workout::WorkoutSource;
use logbook::models::workout_set::AddSetRequest;
use logbook::services::{ExerciseLookup, IdentityResolver, ReplySender, SetService, WorkoutService};
use logbook::utils::errors::{LogbookError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct FakeWorkout {
    pub id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub source: WorkoutSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentReply {
    pub reply_token: String,
    pub messages: Vec<Value>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<String, String>,
    workouts: Vec<FakeWorkout>,
    sets: Vec<AddSetRequest>,
    exercises: HashSet<String>,
    replies: Vec<SentReply>,
    mutations: usize,
    fail_identity: bool,
    fail_add_set: bool,
    fail_create_workout: bool,
    fail_lookups: bool,
    fail_replies: bool,
}

#[derive(Debug, Default)]
pub struct FakeDomain {
    inner: Mutex<Inner>,
}

impl FakeDomain {
    /// Fake with the exercises `ex-123` and `ex-456`
    pub fn new() -> Self {
        let domain = Self::default();
        domain.add_exercise("ex-123");
        domain.add_exercise("ex-456");
        domain
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn add_exercise(&self, exercise_id: &str) {
        self.lock().exercises.insert(exercise_id.to_string());
    }

    /// Internal id the fake assigns to a LINE user
    pub fn user_id_for(line_user_id: &str) -> String {
        format!("user-{}", line_user_id)
    }

    /// Seed an open workout without counting it as a dialogue mutation
    pub fn seed_workout(&self, line_user_id: &str, source: WorkoutSource) -> String {
        let mut inner = self.lock();
        let id = format!("w-{}", inner.workouts.len() + 1);
        inner.workouts.push(FakeWorkout {
            id: id.clone(),
            user_id: Self::user_id_for(line_user_id),
            started_at: Utc::now(),
            ended_at: None,
            source,
        });
        id
    }

    /// End a workout the way another client would, without counting a mutation
    pub fn close_workout(&self, workout_id: &str) {
        if let Some(workout) = self.lock().workouts.iter_mut().find(|w| w.id == workout_id) {
            workout.ended_at = Some(Utc::now());
        }
    }

    pub fn fail_identity(&self, fail: bool) {
        self.lock().fail_identity = fail;
    }

    pub fn fail_add_set(&self, fail: bool) {
        self.lock().fail_add_set = fail;
    }

    pub fn fail_create_workout(&self, fail: bool) {
        self.lock().fail_create_workout = fail;
    }

    pub fn fail_replies(&self, fail: bool) {
        self.lock().fail_replies = fail;
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.lock().fail_lookups = fail;
    }

    pub fn workouts(&self) -> Vec<FakeWorkout> {
        self.lock().workouts.clone()
    }

    pub fn open_workouts(&self) -> Vec<FakeWorkout> {
        self.workouts().into_iter().filter(|w| w.ended_at.is_none()).collect()
    }

    pub fn sets(&self) -> Vec<AddSetRequest> {
        self.lock().sets.clone()
    }

    pub fn replies(&self) -> Vec<SentReply> {
        self.lock().replies.clone()
    }

    pub fn registered_users(&self) -> usize {
        self.lock().users.len()
    }

    /// Number of create/end/add-set calls that changed domain records
    pub fn mutations(&self) -> usize {
        self.lock().mutations
    }
}

#[async_trait]
impl WorkoutService for FakeDomain {
    async fn create_workout(&self, user_id: &str, started_at: DateTime<Utc>, source: WorkoutSource) -> Result<String> {
        let mut inner = self.lock();
        if inner.fail_create_workout {
            return Err(LogbookError::ServiceUnavailable("workouts offline".to_string()));
        }
        let id = format!("w-{}", inner.workouts.len() + 1);
        inner.workouts.push(FakeWorkout {
            id: id.clone(),
            user_id: user_id.to_string(),
            started_at,
            ended_at: None,
            source,
        });
        inner.mutations += 1;
        Ok(id)
    }

    async fn end_workout(&self, workout_id: &str, user_id: &str, ended_at: DateTime<Utc>) -> Result<()> {
        let mut inner = self.lock();
        let workout = inner
            .workouts
            .iter_mut()
            .find(|w| w.id == workout_id && w.user_id == user_id)
            .ok_or_else(|| LogbookError::WorkoutNotFound { workout_id: workout_id.to_string() })?;
        if workout.ended_at.is_some() {
            return Err(LogbookError::WorkoutClosed { workout_id: workout_id.to_string() });
        }
        workout.ended_at = Some(ended_at);
        inner.mutations += 1;
        Ok(())
    }

    async fn latest_open_workout_id(&self, user_id: &str, source: WorkoutSource) -> Result<Option<String>> {
        let inner = self.lock();
        if inner.fail_lookups {
            return Err(LogbookError::ServiceUnavailable("workouts offline".to_string()));
        }
        Ok(inner
            .workouts
            .iter()
            .rev()
            .find(|w| w.user_id == user_id && w.source == source && w.ended_at.is_none())
            .map(|w| w.id.clone()))
    }
}

#[async_trait]
impl SetService for FakeDomain {
    async fn add_set(&self, request: AddSetRequest) -> Result<String> {
        let mut inner = self.lock();
        if inner.fail_add_set {
            return Err(LogbookError::ServiceUnavailable("sets offline".to_string()));
        }
        let owned_and_open = inner
            .workouts
            .iter()
            .any(|w| w.id == request.workout_id && w.user_id == request.user_id && w.ended_at.is_none());
        if !owned_and_open {
            return Err(LogbookError::WorkoutNotFound { workout_id: request.workout_id });
        }
        if !inner.exercises.contains(&request.exercise_id) {
            return Err(LogbookError::ExerciseNotFound { exercise_id: request.exercise_id });
        }
        inner.sets.push(request);
        inner.mutations += 1;
        Ok(format!("s-{}", inner.sets.len()))
    }
}

#[async_trait]
impl ExerciseLookup for FakeDomain {
    async fn exercise_exists(&self, exercise_id: &str) -> Result<bool> {
        let inner = self.lock();
        if inner.fail_lookups {
            return Err(LogbookError::ServiceUnavailable("exercises offline".to_string()));
        }
        Ok(inner.exercises.contains(exercise_id))
    }
}

#[async_trait]
impl IdentityResolver for FakeDomain {
    async fn resolve_user(&self, line_user_id: &str) -> Result<String> {
        let mut inner = self.lock();
        if inner.fail_identity {
            return Err(LogbookError::ServiceUnavailable("users offline".to_string()));
        }
        let user_id = Self::user_id_for(line_user_id);
        inner.users.insert(line_user_id.to_string(), user_id.clone());
        Ok(user_id)
    }
}

#[async_trait]
impl ReplySender for FakeDomain {
    async fn send_reply(&self, reply_token: &str, messages: Vec<Value>) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_replies {
            return Err(LogbookError::LineApi { status: 400, body: "Invalid reply token".to_string() });
        }
        inner.replies.push(SentReply {
            reply_token: reply_token.to_string(),
            messages,
        });
        Ok(())
    }
}
