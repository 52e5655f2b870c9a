//! Conversation state types

use super::Intent;
use serde::{Deserialize, Serialize};

/// Per-session memory carried from one turn to the next
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Intent of the previous turn, `None` before the first turn
    pub last_intent: Option<Intent>,
    pub turn_count: u64,
    /// Set once a farewell is recognized. Closing the session is up to the caller.
    pub should_exit: bool,
    /// Index into the joke list of the joke told most recently
    #[serde(default)]
    pub last_joke: Option<usize>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Output of one responder turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyResult {
    pub reply: String,
    pub state: ConversationState,
    pub should_exit: bool,
}

impl ReplyResult {
    /// Intent the turn was classified as
    pub fn intent(&self) -> Intent {
        self.state.last_intent.unwrap_or(Intent::Unknown)
    }
}
