//! Server configuration loading from file and environment variables.

use revoice_feedback::LlmConfig;
use revoice_voice::VoiceConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Voice platform settings.
    #[serde(default)]
    pub voice: VoiceConfig,

    /// LLM summarizer settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "revoice_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3001
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required setting is absent after file and environment merging.
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `REVOICE_HOST` overrides `server.host`
/// - `REVOICE_PORT` overrides `server.port`
/// - `REVOICE_VOICE_API_KEY` overrides `voice.api_key`
/// - `REVOICE_VOICE_AGENT_ID` overrides `voice.agent_id`
/// - `REVOICE_VOICE_BASE_URL` overrides `voice.base_url`
/// - `REVOICE_LLM_API_KEY` overrides `llm.api_key`
/// - `REVOICE_LLM_MODEL` overrides `llm.model`
/// - `REVOICE_LLM_BASE_URL` overrides `llm.base_url`
/// - `REVOICE_LOG_LEVEL` overrides `logging.level`
/// - `REVOICE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("REVOICE_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("REVOICE_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(api_key) = std::env::var("REVOICE_VOICE_API_KEY") {
        config.voice.api_key = api_key;
    }
    if let Ok(agent_id) = std::env::var("REVOICE_VOICE_AGENT_ID") {
        config.voice.agent_id = agent_id;
    }
    if let Ok(base_url) = std::env::var("REVOICE_VOICE_BASE_URL") {
        config.voice.base_url = base_url;
    }
    if let Ok(api_key) = std::env::var("REVOICE_LLM_API_KEY") {
        config.llm.api_key = api_key;
    }
    if let Ok(model) = std::env::var("REVOICE_LLM_MODEL") {
        config.llm.model = model;
    }
    if let Ok(base_url) = std::env::var("REVOICE_LLM_BASE_URL") {
        config.llm.base_url = base_url;
    }
    if let Ok(level) = std::env::var("REVOICE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("REVOICE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}

impl Config {
    /// Verifies the settings the server cannot start without.
    ///
    /// The voice platform credentials are required up front; the LLM key is
    /// not, because summarization falls back to fixed fields when the call
    /// fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.voice.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("voice.api_key"));
        }
        if self.voice.agent_id.trim().is_empty() {
            return Err(ConfigError::Missing("voice.agent_id"));
        }
        Ok(())
    }
}
