//! HTTP API
//!
//! JSON chat endpoints for the browser page, service metadata, and Twilio
//! voice webhooks.

mod assets;
mod handlers;
mod twilio;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::agent::Agent;
use crate::telephony::TwilioClient;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub telephony: Option<Arc<TwilioClient>>,
    /// Externally reachable base URL without trailing slash
    pub public_url: Arc<str>,
}

impl AppState {
    pub fn new(agent: Arc<Agent>, telephony: Option<TwilioClient>, public_url: &str) -> Self {
        Self {
            agent,
            telephony: telephony.map(Arc::new),
            public_url: Arc::from(public_url.trim_end_matches('/')),
        }
    }

    /// Absolute URL for a path on this server
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.public_url)
    }
}
