use serde::{Deserialize, Serialize};
use std::fmt;

/// Default chat-completion API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_temperature() -> f32 {
    0.4
}

fn default_max_tokens() -> u32 {
    120
}

/// Configuration for the LLM summarizer.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for the chat-completion service. May also arrive via
    /// environment override.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL. Overridable so tests can point the summarizer at a
    /// local stub server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature for the summary call.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token budget. The summary is three short fields, so the
    /// budget is small.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}
