//! Turn orchestration
//!
//! Owns the session table and runs one dialogue turn per utterance: the keyword
//! responder answers first, and utterances it cannot place are forwarded to the
//! hosted language model when one is configured.

mod session;

#[cfg(test)]
pub mod testing;

pub use session::{Session, SessionStore, MAX_HISTORY};

use crate::dialogue::{respond, Clock, Intent};
use crate::llm::{LlmMessage, LlmRequest, LlmService};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};

pub const SYSTEM_PROMPT: &str = "You are a helpful voice assistant. Be concise and friendly. \
     Keep responses short (1-2 sentences) because they are spoken aloud on calls and in the \
     browser. Don't use markdown or special formatting.";

const MODEL_MAX_TOKENS: u32 = 150;
const MODEL_TEMPERATURE: f32 = 0.7;
const MODEL_TIMEOUT: Duration = Duration::from_secs(15);

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Rules,
    Model,
}

/// Result of one turn as seen by a transport
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub intent: Intent,
    pub should_exit: bool,
    pub turn_count: u64,
    pub source: ReplySource,
}

/// Dialogue agent shared by all transports
pub struct Agent {
    sessions: SessionStore,
    llm: Option<Arc<dyn LlmService>>,
    clock: Arc<dyn Clock>,
}

impl Agent {
    pub fn new(llm: Option<Arc<dyn LlmService>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: SessionStore::new(),
            llm,
            clock,
        }
    }

    /// Whether a language model is configured for fallback replies
    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub fn model_id(&self) -> Option<&str> {
        self.llm.as_deref().map(LlmService::model_id)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Begin a fresh session, discarding any previous state under `session_id`
    pub async fn start(&self, session_id: &str) {
        self.sessions.start(session_id).await;
        tracing::info!(session_id, "Session started");
    }

    /// Drop a session. Returns whether it existed.
    pub async fn reset(&self, session_id: &str) -> bool {
        let existed = self.sessions.remove(session_id).await;
        tracing::info!(session_id, existed, "Session reset");
        existed
    }

    /// Drop sessions idle for longer than `ttl`. Returns how many were dropped.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let evicted = self.sessions.evict_idle(Instant::now(), ttl).await;
        if evicted > 0 {
            tracing::info!(evicted, ttl_secs = ttl.as_secs(), "Evicted idle sessions");
        }
        evicted
    }

    /// Handle one utterance for a session.
    ///
    /// A farewell tears the session down after the reply is produced.
    pub async fn handle_turn(&self, session_id: &str, text: &str) -> TurnOutcome {
        let handle = self.sessions.get_or_create(session_id).await;
        let mut session = handle.lock().await;
        session.touch();

        let now = self.clock.now();
        let result = {
            let mut rng = rand::thread_rng();
            respond(text, session.state.clone(), now, &mut rng)
        };
        let intent = result.intent();

        let mut reply = result.reply;
        let mut source = ReplySource::Rules;
        let user_text = text.trim();
        if intent == Intent::Unknown && !user_text.is_empty() {
            if let Some(model_reply) = self.ask_model(&session.history, user_text).await {
                reply = model_reply;
                source = ReplySource::Model;
            }
        }

        if !user_text.is_empty() {
            session.push_history(LlmMessage::user(user_text));
            session.push_history(LlmMessage::assistant(reply.clone()));
        }
        session.state = result.state;

        let outcome = TurnOutcome {
            reply,
            intent,
            should_exit: result.should_exit,
            turn_count: session.state.turn_count,
            source,
        };
        drop(session);

        tracing::info!(
            session_id,
            intent = %outcome.intent,
            turn = outcome.turn_count,
            source = ?outcome.source,
            should_exit = outcome.should_exit,
            "Turn handled"
        );

        if outcome.should_exit {
            self.sessions.remove(session_id).await;
            tracing::info!(session_id, "Session closed after farewell");
        }

        outcome
    }

    /// Ask the model for a reply. Failures are logged and yield `None`.
    async fn ask_model(&self, history: &[LlmMessage], text: &str) -> Option<String> {
        let llm = self.llm.as_ref()?;

        let mut messages = history.to_vec();
        messages.push(LlmMessage::user(text));
        let request = LlmRequest {
            system: Some(SYSTEM_PROMPT.to_string()),
            messages,
            max_tokens: Some(MODEL_MAX_TOKENS),
            temperature: Some(MODEL_TEMPERATURE),
        };

        match timeout(MODEL_TIMEOUT, llm.complete(&request)).await {
            Ok(Ok(response)) if !response.text.trim().is_empty() => {
                Some(response.text.trim().to_string())
            }
            Ok(Ok(_)) => {
                tracing::warn!("Model returned an empty reply, using fallback");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, kind = ?e.kind, "Model request failed, using fallback");
                None
            }
            Err(_) => {
                tracing::warn!("Model request timed out, using fallback");
                None
            }
        }
    }
}
