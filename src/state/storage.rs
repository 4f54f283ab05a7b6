//! State storage implementation
//!
//! This module handles persistence of conversation state, including
//! serialization, deserialization, expiration and corruption recovery.
//! The raw key-value backends know nothing about the records they hold;
//! [`StateStorage`] layers the conversation semantics on top.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn, error};

use crate::config::RedisConfig;
use crate::utils::errors::Result;
use super::conversation::ConversationState;

/// Opaque key-value storage with per-entry TTL
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value`, replacing any previous entry and restarting its TTL
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Redis-backed key-value store
#[derive(Clone)]
pub struct RedisStore {
    connection_manager: redis::aio::ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self { connection_manager })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let value: Option<String> = conn.get(key).await?;
        debug!(key = %key, has_data = value.is_some(), "Redis GET result");
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let ttl_seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        debug!(key = %key, ttl_seconds = ttl_seconds, "Redis SETEX done");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let deleted: u32 = conn.del(key).await?;
        debug!(key = %key, deleted = deleted, "Redis DEL done");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// Process-local key-value store with lazy expiry.
///
/// Used in tests and for single-instance development runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries.values().filter(|entry| entry.expires_at > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(key.to_string(), MemoryEntry { value, expires_at: now + ttl });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Conversation state storage keyed by LINE user id
#[derive(Clone)]
pub struct StateStorage {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
    ttl: Duration,
}

impl StateStorage {
    /// Create a new state storage over a key-value backend
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            ttl,
        }
    }

    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &RedisConfig) -> Self {
        Self::new(store, config.prefix.clone(), Duration::from_secs(config.ttl_seconds))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store key for a user's conversation
    pub fn key(&self, line_user_id: &str) -> String {
        format!("{}conv:{}", self.prefix, line_user_id)
    }

    /// Load a user's conversation.
    ///
    /// Returns `None` when nothing usable is stored: a missing key, an
    /// unreadable or inconsistent record, a logically expired record, or an
    /// unreachable backend. Callers treat all of these as idle.
    pub async fn load(&self, line_user_id: &str) -> Option<ConversationState> {
        let key = self.key(line_user_id);

        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(line_user_id = %line_user_id, "No conversation stored");
                return None;
            }
            Err(e) => {
                error!(line_user_id = %line_user_id, error = %e, "Failed to read conversation, treating as idle");
                return None;
            }
        };

        let Some(state) = ConversationState::decode(&raw) else {
            warn!(line_user_id = %line_user_id, data_length = raw.len(), "Unreadable conversation record, treating as idle");
            return None;
        };

        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::minutes(45));
        if state.is_expired(ttl, Utc::now()) {
            warn!(line_user_id = %line_user_id, updated_at = %state.updated_at, "Conversation has expired, removing");
            if let Err(e) = self.store.delete(&key).await {
                warn!(line_user_id = %line_user_id, error = %e, "Failed to remove expired conversation");
            }
            return None;
        }

        debug!(line_user_id = %line_user_id, phase = %state.phase, "Conversation loaded");
        Some(state)
    }

    /// Save a user's conversation, restarting its TTL
    pub async fn save(&self, line_user_id: &str, state: &ConversationState) -> Result<()> {
        let key = self.key(line_user_id);
        let serialized = state.encode()?;

        self.store.set(&key, serialized, self.ttl).await?;
        debug!(line_user_id = %line_user_id, phase = %state.phase, ttl_seconds = self.ttl.as_secs(), "Conversation saved");
        Ok(())
    }

    /// Delete a user's conversation
    pub async fn clear(&self, line_user_id: &str) -> Result<()> {
        self.store.delete(&self.key(line_user_id)).await?;
        debug!(line_user_id = %line_user_id, "Conversation cleared");
        Ok(())
    }

    /// Check that the backend answers
    pub async fn health_check(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "State store health check failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for StateStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStorage")
            .field("prefix", &self.prefix)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
