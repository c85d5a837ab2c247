//! Structured prompt version records.
//!
//! A [`PromptVersion`] captures everything a feedback pass learned from one
//! conversation. Rendering a record into the version block that gets appended
//! to the prompt text is the feedback crate's job; this module only defines
//! the data.

use serde::{Deserialize, Serialize};

/// One feedback-pass result, attached to the evolved prompt as its single
/// version block.
///
/// The evolved prompt keeps at most one of these: composing a new version
/// replaces the previous record rather than accumulating a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptVersion {
    /// Monotonic version number, starting at 2 for the first evolved prompt
    /// (the configured base prompt is version 1).
    pub number: u32,
    /// Main theme of the conversation, at most a few words.
    pub theme: String,
    /// Dominant emotion, one word.
    pub emotion: String,
    /// Suggested next step, one sentence.
    pub next_step: String,
    /// Up to two salient user quotes, cleaned for display.
    pub quotes: Vec<String>,
    /// Call duration in seconds.
    pub duration_secs: u64,
    /// Number of user transcript lines.
    pub user_messages: u64,
    /// Number of agent transcript lines.
    pub agent_messages: u64,
    /// Vendor identifier of the analyzed conversation.
    pub conversation_id: String,
}

impl PromptVersion {
    /// Returns the display label for this version, e.g. `"v2"`.
    pub fn label(&self) -> String {
        format!("v{}", self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_formats_version_number() {
        let version = PromptVersion {
            number: 7,
            theme: String::new(),
            emotion: String::new(),
            next_step: String::new(),
            quotes: vec![],
            duration_secs: 0,
            user_messages: 0,
            agent_messages: 0,
            conversation_id: String::new(),
        };
        assert_eq!(version.label(), "v7");
    }
}
