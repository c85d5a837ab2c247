//! Shared types for the revoice platform.
//!
//! This crate provides the foundational types used across all revoice crates:
//! the in-memory agent state snapshot, the wire records returned by the
//! voice-agent platform, and the structured prompt version record.
//!
//! No crate in the workspace depends on anything *except* `revoice-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

pub mod prompt;

pub use prompt::PromptVersion;

use serde::{Deserialize, Serialize};

/// Lifecycle status of the local agent.
///
/// `Processing` means a feedback pass is in flight; the agent returns to
/// `Ready` when the pass completes or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// The agent is idle and a new conversation can start.
    Ready,
    /// A feedback pass is analyzing the last conversation.
    Processing,
}

impl AgentStatus {
    /// Returns the lowercase string label for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Processing => "processing",
        }
    }
}

/// A point-in-time view of the agent's in-memory state.
///
/// Process-lifetime only: the snapshot is reset to [`AgentSnapshot::default`]
/// on restart. Mutated exclusively through the server's state store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Current lifecycle status.
    pub status: AgentStatus,
    /// Version label: `"1.0"` initially, then `"v2"`, `"v3"`, … after each
    /// completed feedback pass.
    pub version: String,
    /// Human-readable description of the current state.
    pub description: String,
    /// Number of conversations that completed a feedback pass.
    pub conversations_completed: u64,
    /// The evolved prompt text, once at least one pass has completed.
    pub full_prompt: Option<String>,
}

impl Default for AgentSnapshot {
    fn default() -> Self {
        Self {
            status: AgentStatus::Ready,
            version: "1.0".to_string(),
            description: "Initial agent configuration".to_string(),
            conversations_completed: 0,
            full_prompt: None,
        }
    }
}

/// Who spoke a transcript line.
///
/// The platform reports roles as lowercase strings; anything unrecognized is
/// preserved as [`SpeakerRole::Other`] rather than failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    /// The human caller.
    User,
    /// The voice agent.
    Agent,
    /// Any role this crate does not know about.
    #[serde(other)]
    Other,
}

/// One line of a conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Who spoke the line.
    pub role: SpeakerRole,
    /// The spoken text.
    #[serde(default)]
    pub message: String,
}

/// A conversation record as returned by the platform's list endpoint.
///
/// Owned by the vendor; this system only reads it. Fields the platform may
/// omit default to zero/empty so partial records never fail to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationListItem {
    /// Vendor-assigned conversation identifier.
    pub conversation_id: String,
    /// The agent this conversation belongs to.
    #[serde(default)]
    pub agent_id: String,
    /// Processing status reported by the platform (`"done"` when complete).
    #[serde(default)]
    pub status: String,
    /// Call outcome indicator (`"success"` / `"failure"`), when reported.
    #[serde(default)]
    pub call_successful: Option<String>,
    /// Call duration in seconds.
    #[serde(default)]
    pub call_duration_secs: u64,
    /// Total number of transcript messages.
    #[serde(default)]
    pub message_count: u64,
    /// Call start time as unix seconds, used to order conversations.
    #[serde(default)]
    pub start_time_unix_secs: i64,
}

/// Metadata attached to a detailed conversation record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationMetadata {
    /// Call duration in seconds.
    #[serde(default)]
    pub call_duration_secs: u64,
}

/// A detailed conversation record including its transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationDetail {
    /// Vendor-assigned conversation identifier.
    pub conversation_id: String,
    /// Ordered transcript lines.
    #[serde(default)]
    pub transcript: Vec<TranscriptEntry>,
    /// Call metadata.
    #[serde(default)]
    pub metadata: ConversationMetadata,
}

/// Agent configuration as returned by the platform's agent endpoint.
///
/// Only the nested system prompt is of interest; everything else the vendor
/// returns is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    #[serde(default)]
    pub conversation_config: Option<ConversationConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationConfig {
    #[serde(default)]
    pub agent: Option<AgentConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub prompt: Option<PromptConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl AgentInfo {
    /// Returns the configured base system prompt, if the platform has one.
    pub fn base_prompt(&self) -> Option<&str> {
        self.conversation_config
            .as_ref()?
            .agent
            .as_ref()?
            .prompt
            .as_ref()?
            .prompt
            .as_deref()
    }
}
