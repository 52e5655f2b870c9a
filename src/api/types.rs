//! API request and response types

use crate::agent::ReplySource;
use crate::dialogue::Intent;
use serde::{Deserialize, Serialize};

/// Request to run one chat turn
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
    /// Omitted on the first turn; the response carries the allocated id
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response for a chat turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub status: &'static str,
    pub user_input: String,
    pub agent_reply: String,
    pub session_id: String,
    pub should_exit: bool,
    pub intent: Intent,
    pub source: ReplySource,
}

/// Request to reset a session
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub session_id: String,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: String,
}

/// Feature availability
#[derive(Debug, Serialize)]
pub struct Features {
    pub llm: bool,
    pub telephony: bool,
}

/// Response for the health endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub model: Option<String>,
    pub features: Features,
    pub active_sessions: usize,
}

/// Request to place an outbound call
#[derive(Debug, Deserialize)]
pub struct CallRequest {
    pub to_number: String,
}

/// Response for an outbound call
#[derive(Debug, Serialize)]
pub struct CallResponse {
    pub status: &'static str,
    pub message: String,
    pub call_sid: String,
}

/// Telephony configuration status
#[derive(Debug, Serialize)]
pub struct TwilioStatusResponse {
    pub configured: bool,
    pub phone_number: Option<String>,
    pub voice_webhook_url: String,
    pub gather_webhook_url: String,
}

/// Fields Twilio posts to voice webhooks (all others are ignored)
#[derive(Debug, Default, Deserialize)]
pub struct TwilioWebhookForm {
    #[serde(rename = "CallSid", default)]
    pub call_sid: Option<String>,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: Option<String>,
    /// Sent on status callbacks: queued, ringing, in-progress, completed, ...
    #[serde(rename = "CallStatus", default)]
    pub call_status: Option<String>,
}

impl TwilioWebhookForm {
    /// The call SID, if present and non-blank
    pub fn call_sid(&self) -> Option<&str> {
        self.call_sid.as_deref().map(str::trim).filter(|sid| !sid.is_empty())
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            error: message.into(),
        }
    }
}
