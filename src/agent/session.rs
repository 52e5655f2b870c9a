//! In-memory session table

use crate::dialogue::ConversationState;
use crate::llm::LlmMessage;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

/// Model history kept per session (user and assistant messages)
pub const MAX_HISTORY: usize = 10;

/// One conversation: responder state plus the rolling model history
#[derive(Debug, Clone)]
pub struct Session {
    pub state: ConversationState,
    pub history: Vec<LlmMessage>,
    /// Last time a turn ran, used for idle eviction
    pub last_active: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: ConversationState::default(),
            history: Vec::new(),
            last_active: Instant::now(),
        }
    }
}

impl Session {
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Append a message, dropping the oldest beyond [`MAX_HISTORY`]
    pub fn push_history(&mut self, message: LlmMessage) {
        self.history.push(message);
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }
}

/// Sessions keyed by id. Each session has its own lock so turns of one
/// session run one at a time while different sessions proceed in parallel.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a session, creating it with default state if needed
    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<Session>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(id) {
                return session.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::default())))
            .clone()
    }

    /// Replace a session with a fresh one
    pub async fn start(&self, id: &str) {
        self.sessions
            .write()
            .await
            .insert(id.to_string(), Arc::new(Mutex::new(Session::default())));
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions with no turn for longer than `ttl` as of `now`.
    /// Sessions locked by a running turn are kept. Returns how many were dropped.
    pub async fn evict_idle(&self, now: Instant, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            let Ok(session) = session.try_lock() else {
                return true;
            };
            now.saturating_duration_since(session.last_active) <= ttl
        });
        before - sessions.len()
    }
}
