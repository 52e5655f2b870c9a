//! HTTP request handlers

use super::assets::{serve_page, serve_static};
use super::twilio;
use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, Features, HealthResponse, ResetRequest,
    StatusResponse,
};
use super::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Browser page
        .route("/", get(serve_page))
        .route("/assets/*path", get(serve_static))
        // Service metadata
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/version", get(get_version))
        // Chat
        .route("/chat", post(chat))
        .route("/process", post(chat))
        .route("/session/reset", post(reset_session))
        // Telephony
        .route("/twilio/voice", post(twilio::voice))
        .route("/twilio/gather", post(twilio::gather))
        .route("/twilio/listen", post(twilio::listen))
        .route("/twilio/end", post(twilio::end))
        .route("/twilio/outbound", post(twilio::outbound))
        .route("/twilio/call-status", post(twilio::call_status))
        .route("/twilio/call", post(twilio::place_call))
        .route("/twilio/status", get(twilio::status))
        .with_state(state)
}

// ============================================================
// Service Metadata
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        model: state.agent.model_id().map(str::to_string),
        features: Features {
            llm: state.agent.has_llm(),
            telephony: state.telephony.is_some(),
        },
        active_sessions: state.agent.sessions().len().await,
    })
}

async fn info() -> Json<Value> {
    Json(json!({
        "name": "Voice Agent API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Keyword dialogue agent with language model fallback and Twilio voice calls",
        "endpoints": {
            "web": {
                "GET /": "Speech chat page",
                "GET /health": "Feature status",
                "GET /version": "Plain text version",
                "POST /chat": "Run one chat turn",
                "POST /process": "Alias of /chat",
                "POST /session/reset": "Forget a session"
            },
            "twilio": {
                "POST /twilio/voice": "Incoming call webhook",
                "POST /twilio/gather": "Speech result webhook",
                "POST /twilio/listen": "Silence after a prompt",
                "POST /twilio/end": "Hang up and forget the call",
                "POST /twilio/outbound": "Answered outbound call webhook",
                "POST /twilio/call-status": "Call status callback",
                "POST /twilio/call": "Place an outbound call",
                "GET /twilio/status": "Telephony configuration"
            }
        }
    }))
}

async fn get_version() -> &'static str {
    concat!("voice-agent ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Text cannot be empty".to_string()));
    }

    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let outcome = state.agent.handle_turn(&session_id, &req.text).await;

    Ok(Json(ChatResponse {
        status: "success",
        user_input: req.text,
        agent_reply: outcome.reply,
        session_id,
        should_exit: outcome.should_exit,
        intent: outcome.intent,
        source: outcome.source,
    }))
}

async fn reset_session(
    State(state): State<AppState>,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let existed = state.agent.reset(&req.session_id).await;

    Ok(Json(StatusResponse {
        status: "success",
        message: if existed {
            "Conversation reset".to_string()
        } else {
            "No active conversation".to_string()
        },
    }))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
pub(super) enum AppError {
    BadRequest(String),
    ServiceUnavailable(String),
    BadGateway(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %message, "Request failed");
        }

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{fixed_clock, MockLlm};
    use crate::agent::Agent;
    use crate::dialogue::FALLBACK_REPLY;
    use crate::llm::LlmService;
    use axum::body::Body;
    use axum::http::{header, Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state(llm: Option<Arc<MockLlm>>) -> AppState {
        let agent = Agent::new(
            llm.map(|m| m as Arc<dyn LlmService>),
            Arc::new(fixed_clock(15, 45)),
        );
        AppState::new(Arc::new(agent), None, "https://agent.test/")
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
        let response = create_router(state.clone()).oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_chat_returns_reply_and_session() {
        let state = test_state(None);
        let (status, json) = send(&state, post_json("/chat", r#"{"text":"what time is it"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["user_input"], "what time is it");
        assert!(json["agent_reply"].as_str().unwrap().contains("3:45 PM"));
        assert_eq!(json["intent"], "ask_time");
        assert_eq!(json["source"], "rules");
        assert_eq!(json["should_exit"], false);
        assert!(!json["session_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_is_chat_alias() {
        let state = test_state(None);
        let (status, json) = send(&state, post_json("/process", r#"{"text":"hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["intent"], "greeting");
    }

    #[tokio::test]
    async fn test_malformed_requests_are_rejected() {
        let state = test_state(None);
        for body in [r#"{}"#, r#"{"text": 42}"#, "not json", r#"{"text":"   "}"#] {
            let (status, json) = send(&state, post_json("/chat", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(json["status"], "error");
            assert!(json["error"].is_string());
        }
        // Nothing reached the agent
        assert_eq!(state.agent.sessions().len().await, 0);
    }

    #[tokio::test]
    async fn test_session_continues_and_closes_on_farewell() {
        let state = test_state(None);
        let body = r#"{"text":"hi","session_id":"web-1"}"#;
        let (_, json) = send(&state, post_json("/chat", body)).await;
        assert_eq!(json["session_id"], "web-1");
        assert!(state.agent.sessions().contains("web-1").await);

        let body = r#"{"text":"GOODBYE  ","session_id":"web-1"}"#;
        let (status, json) = send(&state, post_json("/chat", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["should_exit"], true);
        assert_eq!(json["intent"], "farewell");
        assert!(!state.agent.sessions().contains("web-1").await);
    }

    #[tokio::test]
    async fn test_unknown_uses_model_reply() {
        let llm = Arc::new(MockLlm::new());
        llm.queue_text("It's sunny in Paris.");
        let state = test_state(Some(llm));

        let (_, json) = send(&state, post_json("/chat", r#"{"text":"weather in Paris"}"#)).await;
        assert_eq!(json["agent_reply"], "It's sunny in Paris.");
        assert_eq!(json["source"], "model");

        // Queue exhausted: the mock errors and the rules fallback is used
        let (status, json) = send(&state, post_json("/chat", r#"{"text":"and tomorrow"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["agent_reply"], FALLBACK_REPLY);
        assert_eq!(json["source"], "rules");
    }

    #[tokio::test]
    async fn test_reset_session() {
        let state = test_state(None);
        send(&state, post_json("/chat", r#"{"text":"hi","session_id":"s"}"#)).await;

        let (status, json) = send(&state, post_json("/session/reset", r#"{"session_id":"s"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Conversation reset");
        assert!(!state.agent.sessions().contains("s").await);

        let (_, json) = send(&state, post_json("/session/reset", r#"{"session_id":"s"}"#)).await;
        assert_eq!(json["message"], "No active conversation");
    }

    #[tokio::test]
    async fn test_stateless_chats_are_swept_once_idle() {
        let state = test_state(None);
        for _ in 0..50 {
            let (status, _) = send(&state, post_json("/chat", r#"{"text":"hello"}"#)).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(state.agent.sessions().len().await, 50);

        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        send(&state, post_json("/chat", r#"{"text":"hi","session_id":"live"}"#)).await;

        let evicted = state
            .agent
            .evict_idle(std::time::Duration::from_millis(150))
            .await;
        assert_eq!(evicted, 50);
        assert_eq!(state.agent.sessions().len().await, 1);
        assert!(state.agent.sessions().contains("live").await);
    }

    #[tokio::test]
    async fn test_health_reports_features() {
        let state = test_state(Some(Arc::new(MockLlm::new())));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(&state, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["model"], "mock-model");
        assert_eq!(json["features"]["llm"], true);
        assert_eq!(json["features"]["telephony"], false);
    }

    #[tokio::test]
    async fn test_info_lists_endpoints() {
        let state = test_state(None);
        let req = Request::builder().uri("/info").body(Body::empty()).unwrap();
        let (status, json) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        for endpoint in ["GET /", "GET /health", "GET /version", "POST /chat", "POST /process"] {
            assert!(json["endpoints"]["web"][endpoint].is_string(), "{endpoint}");
        }
        for endpoint in [
            "POST /twilio/voice",
            "POST /twilio/gather",
            "POST /twilio/listen",
            "POST /twilio/end",
            "POST /twilio/outbound",
            "POST /twilio/call-status",
            "POST /twilio/call",
            "GET /twilio/status",
        ] {
            assert!(json["endpoints"]["twilio"][endpoint].is_string(), "{endpoint}");
        }
    }

    #[tokio::test]
    async fn test_page_is_served() {
        let state = test_state(None);
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = create_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_static_assets() {
        let state = test_state(None);
        let req = Request::builder()
            .uri("/assets/app.js")
            .body(Body::empty())
            .unwrap();
        let response = create_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.contains("javascript"));

        let req = Request::builder()
            .uri("/assets/missing.js")
            .body(Body::empty())
            .unwrap();
        let response = create_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
