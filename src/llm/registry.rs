//! Provider selection from configuration

use super::{LlmService, LoggingService, OpenAIService};
use std::sync::Arc;

/// Hosted providers speaking the `OpenAI` chat completions protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenAI,
}

impl Provider {
    /// Get the display name for this provider
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::OpenAI => "OpenAI",
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1/chat/completions",
            Provider::OpenAI => "https://api.openai.com/v1/chat/completions",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.3-70b-versatile",
            Provider::OpenAI => "gpt-4o-mini",
        }
    }
}

/// Configuration for the fallback language model
#[derive(Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl LlmConfig {
    /// Read provider settings through `lookup`. Groq wins when both keys are set.
    ///
    /// Returns `None` when no non-empty API key is available.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let (provider, api_key) = [Provider::Groq, Provider::OpenAI]
            .into_iter()
            .find_map(|provider| {
                lookup(provider.api_key_env_var())
                    .filter(|key| !key.trim().is_empty())
                    .map(|key| (provider, key))
            })?;

        Some(Self {
            provider,
            api_key,
            model: lookup("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            endpoint: lookup("LLM_BASE_URL")
                .unwrap_or_else(|| provider.default_endpoint().to_string()),
        })
    }
}

/// Build the logging-wrapped service for a configuration
pub fn build_service(config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
    match OpenAIService::new(&config.api_key, &config.model, &config.endpoint) {
        Ok(service) => Some(Arc::new(LoggingService::new(Arc::new(service)))),
        Err(e) => {
            tracing::error!(
                provider = config.provider.display_name(),
                error = %e,
                "Failed to create LLM client"
            );
            None
        }
    }
}
