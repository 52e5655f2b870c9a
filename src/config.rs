//! Server configuration from environment variables

use crate::llm::LlmConfig;
use crate::telephony::TwilioConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_LOG_FILTER: &str = "voice_agent=info,tower_http=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid AGENT_PORT {0:?}: expected a number between 1 and 65535")]
    InvalidPort(String),
    #[error("invalid AGENT_HOST {0:?}: expected an IP address")]
    InvalidHost(String),
    #[error("invalid AGENT_LOG_JSON {0:?}: expected true or false")]
    InvalidBool(String),
    #[error("invalid AGENT_SESSION_TTL_SECS {0:?}: expected a positive number of seconds")]
    InvalidSessionTtl(String),
}

/// Top-level configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Externally reachable base URL, used in Twilio webhook callbacks
    pub public_url: String,
    /// Emit JSON log lines instead of human-readable text
    pub log_json: bool,
    /// Sessions without a turn for this long are dropped
    pub session_ttl: Duration,
    pub llm: Option<LlmConfig>,
    pub twilio: Option<TwilioConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = match lookup("AGENT_HOST") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidHost(raw))?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        let port = match lookup("AGENT_PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) if port != 0 => port,
                _ => return Err(ConfigError::InvalidPort(raw)),
            },
            None => DEFAULT_PORT,
        };

        let log_json = match lookup("AGENT_LOG_JSON").as_deref().map(str::to_ascii_lowercase) {
            None => true,
            Some(v) if v == "true" || v == "1" => true,
            Some(v) if v == "false" || v == "0" => false,
            Some(v) => return Err(ConfigError::InvalidBool(v)),
        };

        let session_ttl = match lookup("AGENT_SESSION_TTL_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs != 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidSessionTtl(raw)),
            },
            None => DEFAULT_SESSION_TTL,
        };

        let public_url = lookup("PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://{host}:{port}"));

        Ok(Self {
            host,
            port,
            public_url,
            log_json,
            session_ttl,
            llm: LlmConfig::from_lookup(&lookup),
            twilio: TwilioConfig::from_lookup(&lookup),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
