//! Voice Agent HTTP server

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use voice_agent::agent::Agent;
use voice_agent::api::{create_router, AppState};
use voice_agent::config::{Config, DEFAULT_LOG_FILTER};
use voice_agent::dialogue::SystemClock;
use voice_agent::llm::build_service;
use voice_agent::telephony::TwilioClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // Initialize logging
    let (json_layer, text_layer) = if config.log_json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false);
        (Some(layer), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(json_layer)
        .with(text_layer)
        .init();

    // Language model fallback
    let llm = config.llm.as_ref().and_then(build_service);
    match &config.llm {
        Some(llm_config) => tracing::info!(
            provider = llm_config.provider.display_name(),
            model = %llm_config.model,
            "Language model fallback enabled"
        ),
        None => tracing::warn!(
            "No language model API key configured. Set GROQ_API_KEY or OPENAI_API_KEY for open-ended replies."
        ),
    }

    // Telephony
    let telephony = match config.twilio.clone() {
        Some(twilio_config) => match TwilioClient::new(twilio_config) {
            Ok(client) => {
                tracing::info!(phone_number = client.phone_number(), "Twilio configured");
                Some(client)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create Twilio client");
                None
            }
        },
        None => {
            tracing::info!("Twilio not configured, telephony endpoints disabled");
            None
        }
    };

    let agent = Arc::new(Agent::new(llm, Arc::new(SystemClock)));
    tokio::spawn(sweep_idle_sessions(agent.clone(), config.session_ttl));
    let state = AppState::new(agent, telephony, &config.public_url);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, public_url = %config.public_url, "Voice agent listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Voice agent shut down");
    Ok(())
}

/// Periodically drop sessions nobody has talked to within `ttl`
async fn sweep_idle_sessions(agent: Arc<Agent>, ttl: Duration) {
    tracing::info!(ttl_secs = ttl.as_secs(), "Idle session sweeper started");
    let mut ticker = interval(ttl.min(Duration::from_secs(60)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        agent.evict_idle(ttl).await;
    }
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
