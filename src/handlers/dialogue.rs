//! Dialogue orchestrator
//!
//! Per-event controller: resolves the user, loads the conversation, runs the
//! state machine, carries out the requested domain call, stores the result
//! and picks the reply.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn, Instrument};

use crate::config::WizardConfig;
use crate::models::line_event::{InboundEvent, InboundKind};
use crate::models::workout::WorkoutSource;
use crate::models::workout_set::AddSetRequest;
use crate::services::ServiceFactory;
use crate::state::machine::parse_exercise_id;
use crate::state::{
    transition, CompletedEntry, ConversationState, Effect, Facts, Intent, Phase, Prompt, StateStorage, UserLocks,
    WizardRules,
};
use crate::utils::errors::{LogbookError, Result};
use crate::utils::logging::{log_domain_call, log_phase_change, log_user_action};
use super::commands::resolve_intent;
use super::replies::{OutboundReply, ReplyComposer};

/// Drives the data-entry dialogue for one event at a time
pub struct DialogueOrchestrator {
    services: ServiceFactory,
    storage: StateStorage,
    composer: Arc<ReplyComposer>,
    rules: WizardRules,
    verify_exercise_exists: bool,
    locks: Option<UserLocks>,
}

impl DialogueOrchestrator {
    pub fn new(
        services: ServiceFactory,
        storage: StateStorage,
        composer: Arc<ReplyComposer>,
        config: &WizardConfig,
    ) -> Self {
        Self {
            services,
            storage,
            composer,
            rules: WizardRules::from(config),
            verify_exercise_exists: config.verify_exercise_exists,
            locks: config.serialize_per_user.then(UserLocks::new),
        }
    }

    pub fn storage(&self) -> &StateStorage {
        &self.storage
    }

    /// Handle one event and return the reply for it
    pub async fn handle_event(&self, event: &InboundEvent) -> OutboundReply {
        let span = tracing::info_span!(
            "dialogue",
            line_user_id = %event.line_user_id,
            kind = event.kind_name(),
            webhook_event_id = event.webhook_event_id.as_deref().unwrap_or("-"),
        );

        async {
            if event.is_redelivery {
                info!("Processing redelivered event");
            }

            let _guard = match &self.locks {
                Some(locks) => Some(locks.acquire(&event.line_user_id).await),
                None => None,
            };

            let prompt = self.process(event).await;
            debug!(prompt = ?prompt, "Reply selected");
            self.composer.compose(prompt)
        }
        .instrument(span)
        .await
    }

    async fn process(&self, event: &InboundEvent) -> Prompt {
        let line_user_id = event.line_user_id.as_str();

        let user_id = match self.services.identity.resolve_user(line_user_id).await {
            Ok(user_id) => user_id,
            Err(e) => {
                error!(error = %e, severity = %e.severity(), "Failed to resolve user");
                return Prompt::RegistrationFailed;
            }
        };

        if event.kind == InboundKind::Follow {
            log_user_action(line_user_id, "follow", None);
            return Prompt::Welcome;
        }

        let now = Utc::now();
        let state = self
            .storage
            .load(line_user_id)
            .await
            .unwrap_or_else(|| ConversationState::idle(now));

        let intent = resolve_intent(&event.kind, state.phase);
        log_user_action(line_user_id, intent.name(), None);

        let facts = match self.gather_facts(&user_id, &state, &intent).await {
            Ok(facts) => facts,
            Err(e) => {
                error!(user_id = %user_id, intent = intent.name(), error = %e, "Failed to look up dialogue facts");
                return Prompt::TryAgain;
            }
        };

        let step = transition(&state, &intent, &facts, &self.rules, now);
        if step.next.phase != state.phase {
            log_phase_change(line_user_id, state.phase.as_str(), step.next.phase.as_str(), intent.name());
        }

        match step.effect {
            None => {
                if step.changed {
                    if let Err(e) = self.persist(line_user_id, &step.next).await {
                        error!(error = %e, phase = %step.next.phase, "Failed to store conversation");
                        return Prompt::TryAgain;
                    }
                }
                step.prompt
            }

            Some(Effect::CreateWorkout) => {
                match self.services.workouts.create_workout(&user_id, now, WorkoutSource::Line).await {
                    Ok(workout_id) => {
                        log_domain_call("create_workout", &user_id, true, Some(workout_id.as_str()));
                        step.prompt
                    }
                    Err(e) => {
                        log_domain_call("create_workout", &user_id, false, Some(e.to_string().as_str()));
                        Prompt::TryAgain
                    }
                }
            }

            Some(Effect::EndWorkout { workout_id }) => {
                if let Err(e) = self.services.workouts.end_workout(&workout_id, &user_id, now).await {
                    log_domain_call("end_workout", &user_id, false, Some(e.to_string().as_str()));
                    let stale_entry = state.workout_id.as_deref() == Some(workout_id.as_str())
                        && matches!(e, LogbookError::WorkoutNotFound { .. } | LogbookError::WorkoutClosed { .. });
                    if !stale_entry {
                        return Prompt::TryAgain;
                    }
                    return self.end_latest_open(line_user_id, &user_id, &state, now).await;
                }
                log_domain_call("end_workout", &user_id, true, Some(workout_id.as_str()));

                if step.changed {
                    if let Err(e) = self.persist(line_user_id, &step.next).await {
                        warn!(error = %e, "Workout ended but conversation could not be reset");
                    }
                }
                step.prompt
            }

            Some(Effect::CommitSet(entry)) => {
                let prompt = self.commit(&user_id, entry, step.prompt).await;
                self.discard(line_user_id).await;
                prompt
            }
        }
    }

    /// End the latest open workout after the running entry's workout turned
    /// out to be gone. The entry is dropped either way.
    async fn end_latest_open(
        &self,
        line_user_id: &str,
        user_id: &str,
        state: &ConversationState,
        now: DateTime<Utc>,
    ) -> Prompt {
        info!(workout_id = ?state.workout_id, "Running entry points at a closed workout, dropping it");
        self.discard(line_user_id).await;
        log_phase_change(line_user_id, state.phase.as_str(), Phase::Idle.as_str(), Intent::End.name());

        let fallback = match self.services.workouts.latest_open_workout_id(user_id, WorkoutSource::Line).await {
            Ok(Some(workout_id)) => workout_id,
            Ok(None) => return Prompt::NothingToEnd,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to look up open workout");
                return Prompt::TryAgain;
            }
        };

        match self.services.workouts.end_workout(&fallback, user_id, now).await {
            Ok(()) => {
                log_domain_call("end_workout", user_id, true, Some(fallback.as_str()));
                Prompt::WorkoutEnded
            }
            Err(e) => {
                log_domain_call("end_workout", user_id, false, Some(e.to_string().as_str()));
                Prompt::TryAgain
            }
        }
    }

    /// Look up what the transition needs to know about the domain
    async fn gather_facts(&self, user_id: &str, state: &ConversationState, intent: &Intent) -> Result<Facts> {
        let mut facts = Facts::default();

        let needs_open_workout = match intent {
            Intent::AddEntry => true,
            Intent::End => state.workout_id.is_none(),
            _ => false,
        };
        if needs_open_workout {
            facts.open_workout_id = self
                .services
                .workouts
                .latest_open_workout_id(user_id, WorkoutSource::Line)
                .await?;
        }

        if let Intent::ProvideField(text) = intent {
            if self.verify_exercise_exists && state.phase == Phase::AwaitingExercise {
                if let Ok(exercise_id) = parse_exercise_id(text, &self.rules) {
                    facts.exercise_known = Some(self.services.exercises.exercise_exists(&exercise_id).await?);
                }
            }
        }

        Ok(facts)
    }

    async fn commit(&self, user_id: &str, entry: CompletedEntry, success: Prompt) -> Prompt {
        let request = AddSetRequest {
            user_id: user_id.to_string(),
            workout_id: entry.workout_id,
            exercise_id: entry.exercise_id,
            reps: entry.reps,
            weight_kg: entry.weight_kg,
        };

        match self.services.sets.add_set(request).await {
            Ok(set_id) => {
                log_domain_call("add_set", user_id, true, Some(set_id.as_str()));
                success
            }
            Err(e) => {
                log_domain_call("add_set", user_id, false, Some(e.to_string().as_str()));
                Prompt::CommitFailed
            }
        }
    }

    /// Write the next state, or delete the record when the dialogue is idle
    async fn persist(&self, line_user_id: &str, next: &ConversationState) -> Result<()> {
        if next.is_idle() {
            self.discard(line_user_id).await;
            Ok(())
        } else {
            self.storage.save(line_user_id, next).await
        }
    }

    async fn discard(&self, line_user_id: &str) {
        if let Err(e) = self.storage.clear(line_user_id).await {
            warn!(error = %e, "Failed to delete conversation, it will expire on its own");
        }
    }
}
