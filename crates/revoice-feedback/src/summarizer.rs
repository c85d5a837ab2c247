//! LLM summarization of conversation transcripts.

use crate::config::LlmConfig;
use crate::error::FeedbackError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout for a single chat-completion request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Instruction for the summary call. Demands a single JSON line so the
/// response can be parsed without stripping markdown fences.
const SUMMARY_SYSTEM_PROMPT: &str = concat!(
    "Return ONE line of valid JSON with exactly these keys: ",
    r#"{"theme":"<up to 7 words>","emotion":"<one word>","next_step":"<1 sentence>"} "#,
    "No markdown, no extra keys, keep it on one line."
);

/// The three summary fields extracted from a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Main theme of the conversation.
    pub theme: String,
    /// Dominant emotion, one word.
    pub emotion: String,
    /// Suggested next step, one sentence.
    pub next_step: String,
}

impl SessionSummary {
    /// Fixed values used when summarization fails. Prompt composition
    /// proceeds with these rather than aborting the feedback pass.
    pub fn fallback() -> Self {
        Self {
            theme: "general wellbeing".to_string(),
            emotion: "neutral".to_string(),
            next_step: "none".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// Client for the chat-completion API, specialized to the summary call.
#[derive(Debug, Clone)]
pub struct Summarizer {
    http: reqwest::Client,
    config: LlmConfig,
}

impl Summarizer {
    /// Creates a new summarizer from the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    /// Asks the LLM for a [`SessionSummary`] of the given conversation text.
    ///
    /// Any failure surfaces as an error; callers decide whether to fall back
    /// to [`SessionSummary::fallback`].
    pub async fn summarize(&self, conversation_text: &str) -> Result<SessionSummary, FeedbackError> {
        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SUMMARY_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: conversation_text,
                },
            ],
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "LLM returned an error");
            return Err(FeedbackError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp.json().await?;
        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| FeedbackError::Decode("response carried no choices".to_string()))?;

        serde_json::from_str(content).map_err(|e| {
            FeedbackError::Decode(format!("summary is not the expected JSON shape: {}", e))
        })
    }
}
