//! Test context wiring the dialogue to in-memory collaborators

use std::sync::Arc;
use std::time::Duration;

use logbook::config::Settings;
use logbook::handlers::{AppState, DialogueOrchestrator, OutboundReply, ReplyComposer};
use logbook::models::line_event::InboundEvent;
use logbook::services::ServiceFactory;
use logbook::state::{ConversationState, InMemoryStore, KeyValueStore, StateStorage};

use super::fakes::FakeDomain;
use super::line_mock::TEST_CHANNEL_SECRET;

pub const TEST_TTL: Duration = Duration::from_secs(45 * 60);

pub struct TestContext {
    pub domain: Arc<FakeDomain>,
    pub store: Arc<InMemoryStore>,
    pub storage: StateStorage,
    pub orchestrator: Arc<DialogueOrchestrator>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_composer(ReplyComposer::text_only())
    }

    pub fn with_composer(composer: ReplyComposer) -> Self {
        let domain = Arc::new(FakeDomain::new());
        let store = Arc::new(InMemoryStore::new());
        let storage = StateStorage::new(store.clone(), "test:", TEST_TTL);

        let services = ServiceFactory {
            workouts: domain.clone(),
            sets: domain.clone(),
            exercises: domain.clone(),
            identity: domain.clone(),
            replies: domain.clone(),
        };
        let wizard = Settings::default().wizard;
        let orchestrator = DialogueOrchestrator::new(services, storage.clone(), Arc::new(composer), &wizard);

        Self {
            domain,
            store,
            storage,
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.orchestrator.clone(), self.domain.clone(), TEST_CHANNEL_SECRET)
    }

    pub async fn send(&self, event: InboundEvent) -> OutboundReply {
        self.orchestrator.handle_event(&event).await
    }

    pub async fn say(&self, line_user_id: &str, text: &str) -> String {
        self.send(InboundEvent::text(line_user_id, text)).await.text
    }

    pub async fn press(&self, line_user_id: &str, data: &str) -> String {
        self.send(InboundEvent::postback(line_user_id, data)).await.text
    }

    pub async fn stored_state(&self, line_user_id: &str) -> Option<ConversationState> {
        self.storage.load(line_user_id).await
    }

    /// Raw record as held by the store
    pub async fn raw_record(&self, line_user_id: &str) -> Option<String> {
        self.store.get(&self.storage.key(line_user_id)).await.unwrap()
    }
}
