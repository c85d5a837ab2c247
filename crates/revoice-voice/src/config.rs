use serde::{Deserialize, Serialize};
use std::fmt;

/// Default platform API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_poll_max_attempts() -> u32 {
    15
}

fn default_poll_delay_ms() -> u64 {
    3000
}

/// Configuration for the voice platform client.
#[derive(Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Platform API key. May also arrive via environment override, so a
    /// config file without it still parses; startup validation rejects an
    /// empty key.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// The agent whose conversations this backend manages.
    #[serde(default)]
    pub agent_id: String,

    /// API base URL. Overridable so tests can point the client at a local
    /// stub server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum number of polling attempts when waiting for a conversation.
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,

    /// Delay between polling attempts in milliseconds.
    #[serde(default = "default_poll_delay_ms")]
    pub poll_delay_ms: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            agent_id: String::new(),
            base_url: default_base_url(),
            poll_max_attempts: default_poll_max_attempts(),
            poll_delay_ms: default_poll_delay_ms(),
        }
    }
}

impl fmt::Debug for VoiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceConfig")
            .field("api_key", &"[REDACTED]")
            .field("agent_id", &self.agent_id)
            .field("base_url", &self.base_url)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("poll_delay_ms", &self.poll_delay_ms)
            .finish()
    }
}

impl VoiceConfig {
    pub fn new(api_key: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            agent_id: agent_id.into(),
            ..Self::default()
        }
    }
}
