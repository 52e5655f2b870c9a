//! Twilio voice webhooks
//!
//! Each call is a session keyed by its `CallSid`. Twilio transcribes the
//! caller, posts the text to `/twilio/gather`, and speaks whatever we return.

use super::handlers::AppError;
use super::types::{CallRequest, CallResponse, TwilioStatusResponse, TwilioWebhookForm};
use super::AppState;
use crate::telephony::{TelephonyError, Twiml};
use axum::{
    extract::{rejection::JsonRejection, Form, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

const INBOUND_GREETING: &str = "Hello! Welcome to the voice agent. How can I help you today?";
const OUTBOUND_GREETING: &str = "Hello! This is the voice agent calling. How can I assist you today?";
const NO_INPUT_RETRY: &str = "I didn't hear anything. Please try again.";
const ANYTHING_ELSE: &str = "Is there anything else I can help with?";
const NO_INPUT_GOODBYE: &str = "I didn't hear a response. Goodbye!";

/// Call statuses after which Twilio sends no more webhooks for the call
const FINAL_CALL_STATUSES: &[&str] = &["completed", "busy", "failed", "no-answer", "canceled"];

fn twiml(doc: &Twiml) -> Response {
    ([(header::CONTENT_TYPE, "application/xml")], doc.render()).into_response()
}

fn require_call_sid(form: &TwilioWebhookForm) -> Result<&str, AppError> {
    form.call_sid()
        .ok_or_else(|| AppError::BadRequest("CallSid is required".to_string()))
}

/// Incoming call: fresh session, greet, listen
pub(super) async fn voice(
    State(state): State<AppState>,
    Form(form): Form<TwilioWebhookForm>,
) -> Result<Response, AppError> {
    let call_sid = require_call_sid(&form)?;
    tracing::info!(
        call_sid,
        from = form.from.as_deref().unwrap_or("unknown"),
        "Incoming call"
    );
    state.agent.start(call_sid).await;

    Ok(twiml(
        &Twiml::new()
            .say(INBOUND_GREETING)
            .gather(state.url("/twilio/gather"))
            .say(NO_INPUT_RETRY)
            .redirect(state.url("/twilio/listen")),
    ))
}

/// Outbound call answered: introduce, listen, hang up on silence
pub(super) async fn outbound(
    State(state): State<AppState>,
    Form(form): Form<TwilioWebhookForm>,
) -> Result<Response, AppError> {
    let call_sid = require_call_sid(&form)?;
    tracing::info!(call_sid, "Outbound call answered");
    state.agent.start(call_sid).await;

    Ok(twiml(
        &Twiml::new()
            .say(OUTBOUND_GREETING)
            .gather(state.url("/twilio/gather"))
            .say(NO_INPUT_GOODBYE)
            .redirect(state.url("/twilio/end")),
    ))
}

/// Caller finished speaking: run one turn
pub(super) async fn gather(
    State(state): State<AppState>,
    Form(form): Form<TwilioWebhookForm>,
) -> Result<Response, AppError> {
    let call_sid = require_call_sid(&form)?;
    let speech = form.speech_result.as_deref().unwrap_or_default();
    tracing::info!(call_sid, speech, "Caller speech received");

    let outcome = state.agent.handle_turn(call_sid, speech).await;

    let doc = if outcome.should_exit {
        Twiml::new().say(outcome.reply).hangup()
    } else {
        Twiml::new()
            .say(outcome.reply)
            .gather(state.url("/twilio/gather"))
            .say(ANYTHING_ELSE)
            .redirect(state.url("/twilio/listen"))
    };
    Ok(twiml(&doc))
}

/// Caller stayed silent after a prompt: listen once more, then end
pub(super) async fn listen(State(state): State<AppState>) -> Response {
    twiml(
        &Twiml::new()
            .gather(state.url("/twilio/gather"))
            .say(NO_INPUT_GOODBYE)
            .redirect(state.url("/twilio/end")),
    )
}

/// Tear down the call's session and hang up
pub(super) async fn end(
    State(state): State<AppState>,
    Form(form): Form<TwilioWebhookForm>,
) -> Result<Response, AppError> {
    let call_sid = require_call_sid(&form)?;
    state.agent.reset(call_sid).await;
    tracing::info!(call_sid, "Call ended without input");
    Ok(twiml(&Twiml::new().hangup()))
}

/// Status callback: drop the session once the call is over
pub(super) async fn call_status(
    State(state): State<AppState>,
    Form(form): Form<TwilioWebhookForm>,
) -> Result<StatusCode, AppError> {
    let call_sid = require_call_sid(&form)?;
    let status = form.call_status.as_deref().unwrap_or_default();
    tracing::info!(call_sid, status, "Call status update");

    if FINAL_CALL_STATUSES.contains(&status) {
        state.agent.reset(call_sid).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Place an outbound call through the Twilio REST API
pub(super) async fn place_call(
    State(state): State<AppState>,
    payload: Result<Json<CallRequest>, JsonRejection>,
) -> Result<Json<CallResponse>, AppError> {
    let Some(client) = state.telephony.as_ref() else {
        return Err(AppError::ServiceUnavailable(
            "Twilio not configured".to_string(),
        ));
    };

    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let to = req.to_number.trim();
    if to.is_empty() {
        return Err(AppError::BadRequest("Phone number required".to_string()));
    }

    let call_sid = client
        .create_call(to, &state.url("/twilio/outbound"))
        .await
        .map_err(|e| {
            tracing::error!(to, error = %e, "Outbound call failed");
            match e {
                TelephonyError::Rejected { message, .. } => AppError::BadGateway(message),
                other => AppError::BadGateway(other.to_string()),
            }
        })?;

    Ok(Json(CallResponse {
        status: "success",
        message: format!("Call initiated to {to}"),
        call_sid,
    }))
}

/// Telephony configuration status
pub(super) async fn status(State(state): State<AppState>) -> Json<TwilioStatusResponse> {
    Json(TwilioStatusResponse {
        configured: state.telephony.is_some(),
        phone_number: state
            .telephony
            .as_ref()
            .map(|client| client.phone_number().to_string()),
        voice_webhook_url: state.url("/twilio/voice"),
        gather_webhook_url: state.url("/twilio/gather"),
    })
}
