//! The end-to-end feedback pass.

use crate::error::FeedbackError;
use crate::prompt::{pick_top_quotes, EvolvedPrompt};
use crate::summarizer::{SessionSummary, Summarizer};
use revoice_types::{PromptVersion, SpeakerRole, TranscriptEntry};
use revoice_voice::VoiceClient;
use std::sync::Arc;

/// Prompt used when neither the caller nor the platform supplies one.
const DEFAULT_BASE_PROMPT: &str = "You are a helpful assistant.";

/// Result of a completed feedback pass.
#[derive(Debug, Clone)]
pub struct FeedbackOutcome {
    /// Display label for the new version, e.g. `"v2"`.
    pub version_label: String,
    /// Human-readable description of the update.
    pub description: String,
    /// The analyzed conversation's identifier.
    pub conversation_id: String,
    /// The complete evolved prompt text.
    pub full_prompt: String,
}

/// Runs feedback passes: waits for the latest conversation, summarizes it,
/// and composes the next evolved prompt.
#[derive(Debug, Clone)]
pub struct FeedbackEngine {
    voice: Arc<VoiceClient>,
    summarizer: Summarizer,
}

impl FeedbackEngine {
    pub fn new(voice: Arc<VoiceClient>, summarizer: Summarizer) -> Self {
        Self { voice, summarizer }
    }

    /// Runs one feedback pass.
    ///
    /// `current_prompt` is the prompt to improve upon; when absent (or
    /// blank) the agent's configured base prompt is fetched from the
    /// platform instead. `next_version` is the version number the new block
    /// gets; the caller owns the counter.
    ///
    /// Summarization failures are not fatal: the pass falls back to
    /// [`SessionSummary::fallback`] and still completes. Everything else
    /// (no ready conversation, platform errors) is.
    pub async fn process(
        &self,
        current_prompt: Option<String>,
        next_version: u32,
    ) -> Result<FeedbackOutcome, FeedbackError> {
        tracing::info!("starting feedback pass");

        let conversation = self
            .voice
            .wait_for_latest_conversation()
            .await
            .ok_or(FeedbackError::NoConversation)?;

        let detail = self
            .voice
            .conversation_details(&conversation.conversation_id)
            .await?;

        let current_prompt = match current_prompt {
            Some(prompt) if !prompt.trim().is_empty() => prompt,
            _ => {
                let info = self.voice.agent_info().await?;
                info.base_prompt().unwrap_or(DEFAULT_BASE_PROMPT).to_string()
            }
        };

        let user_messages = count_role(&detail.transcript, SpeakerRole::User);
        let agent_messages = count_role(&detail.transcript, SpeakerRole::Agent);

        tracing::info!(
            conversation_id = %conversation.conversation_id,
            messages = detail.transcript.len(),
            user_messages,
            agent_messages,
            "analyzing conversation"
        );

        let conversation_text = render_transcript(&detail.transcript);
        let summary = match self.summarizer.summarize(&conversation_text).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!("summarization failed, using fallback fields: {}", e);
                SessionSummary::fallback()
            }
        };

        let version = PromptVersion {
            number: next_version,
            theme: summary.theme,
            emotion: summary.emotion,
            next_step: summary.next_step,
            quotes: pick_top_quotes(&detail.transcript),
            duration_secs: detail.metadata.call_duration_secs,
            user_messages,
            agent_messages,
            conversation_id: conversation.conversation_id.clone(),
        };
        let version_label = version.label();

        let full_prompt = EvolvedPrompt::parse(&current_prompt)
            .with_version(version)
            .render();

        tracing::info!(
            conversation_id = %conversation.conversation_id,
            version = %version_label,
            prompt_chars = full_prompt.chars().count(),
            "feedback pass completed"
        );

        Ok(FeedbackOutcome {
            version_label,
            description: "Enhanced based on conversation analysis".to_string(),
            conversation_id: conversation.conversation_id,
            full_prompt,
        })
    }
}

fn count_role(transcript: &[TranscriptEntry], role: SpeakerRole) -> u64 {
    transcript.iter().filter(|entry| entry.role == role).count() as u64
}

/// Collapses a transcript into plain text the LLM can read.
fn render_transcript(transcript: &[TranscriptEntry]) -> String {
    transcript
        .iter()
        .map(|entry| {
            let speaker = match entry.role {
                SpeakerRole::User => "User",
                _ => "Agent",
            };
            format!("{}: {}", speaker, entry.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_renders_role_tagged_lines() {
        let transcript = vec![
            TranscriptEntry {
                role: SpeakerRole::Agent,
                message: "Hello there.".to_string(),
            },
            TranscriptEntry {
                role: SpeakerRole::User,
                message: "Hi, I need some advice.".to_string(),
            },
        ];

        assert_eq!(
            render_transcript(&transcript),
            "Agent: Hello there.\nUser: Hi, I need some advice."
        );
    }
}
