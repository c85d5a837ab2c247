use crate::config::VoiceConfig;
use crate::error::VoiceError;
use revoice_types::{AgentInfo, ConversationDetail, ConversationListItem};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

/// Platform authentication header.
const API_KEY_HEADER: &str = "xi-api-key";

/// Timeout for a single platform request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    signed_url: String,
}

#[derive(Debug, Deserialize)]
struct ConversationsResponse {
    #[serde(default)]
    conversations: Vec<ConversationListItem>,
}

/// Client for the voice platform's REST API.
#[derive(Debug, Clone)]
pub struct VoiceClient {
    http: reqwest::Client,
    config: VoiceConfig,
}

impl VoiceClient {
    /// Creates a new client from the given configuration.
    pub fn new(config: VoiceConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    /// Returns the agent this client is bound to.
    pub fn agent_id(&self) -> &str {
        &self.config.agent_id
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, VoiceError> {
        let url = format!("{}{}", self.config.base_url, path_and_query);
        let resp = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(%url, status = status.as_u16(), "voice platform returned an error");
            return Err(VoiceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json::<T>().await?)
    }

    /// Issues a short-lived signed URL for starting a conversation session
    /// with the agent.
    pub async fn signed_url(&self) -> Result<String, VoiceError> {
        let resp: SignedUrlResponse = self
            .get_json(&format!(
                "/convai/conversation/get-signed-url?agent_id={}",
                self.config.agent_id
            ))
            .await?;
        Ok(resp.signed_url)
    }

    /// Returns the most recent conversation for this agent, but only once it
    /// is ready for analysis.
    ///
    /// Returns `Ok(None)` when the agent has no conversations yet or the
    /// latest one is still being processed by the platform.
    pub async fn latest_conversation(&self) -> Result<Option<ConversationListItem>, VoiceError> {
        let resp: ConversationsResponse = self.get_json("/convai/conversations").await?;

        let mut conversations: Vec<ConversationListItem> = resp
            .conversations
            .into_iter()
            .filter(|conv| conv.agent_id == self.config.agent_id)
            .collect();

        tracing::debug!(
            agent_id = %self.config.agent_id,
            count = conversations.len(),
            "fetched conversation list"
        );

        if conversations.is_empty() {
            return Ok(None);
        }

        conversations.sort_by_key(|conv| std::cmp::Reverse(conv.start_time_unix_secs));
        let latest = conversations.remove(0);

        if !is_conversation_ready(&latest) {
            return Ok(None);
        }

        Ok(Some(latest))
    }

    /// Fetches the detailed record (including transcript) for a conversation.
    pub async fn conversation_details(
        &self,
        conversation_id: &str,
    ) -> Result<ConversationDetail, VoiceError> {
        let detail: ConversationDetail = self
            .get_json(&format!("/convai/conversations/{}", conversation_id))
            .await?;

        tracing::debug!(
            conversation_id,
            messages = detail.transcript.len(),
            duration_secs = detail.metadata.call_duration_secs,
            "fetched conversation details"
        );

        Ok(detail)
    }

    /// Fetches the agent's configuration, including its base system prompt.
    pub async fn agent_info(&self) -> Result<AgentInfo, VoiceError> {
        self.get_json(&format!("/convai/agents/{}", self.config.agent_id))
            .await
    }

    /// Polls until the latest conversation is available and ready.
    ///
    /// Bounded linear retry: a fixed number of attempts with a fixed delay,
    /// no backoff. Attempt errors are logged and retried. Returns `None`
    /// once the attempts are exhausted without finding a ready conversation.
    pub async fn wait_for_latest_conversation(&self) -> Option<ConversationListItem> {
        let max_attempts = self.config.poll_max_attempts;
        let delay = Duration::from_millis(self.config.poll_delay_ms);

        tracing::info!(max_attempts, delay_ms = self.config.poll_delay_ms, "waiting for conversation");

        for attempt in 1..=max_attempts {
            match self.latest_conversation().await {
                Ok(Some(conversation)) => {
                    tracing::info!(
                        attempt,
                        conversation_id = %conversation.conversation_id,
                        "found ready conversation"
                    );
                    return Some(conversation);
                }
                Ok(None) => {
                    tracing::debug!(attempt, max_attempts, "no ready conversation yet");
                }
                Err(e) => {
                    tracing::warn!(attempt, max_attempts, "poll attempt failed: {}", e);
                }
            }

            if attempt < max_attempts {
                sleep(delay).await;
            }
        }

        tracing::warn!(max_attempts, "no conversation found after exhausting attempts");
        None
    }
}

/// Returns `true` if a conversation is complete enough to analyze.
///
/// The platform lists conversations before it finishes processing them, and
/// also records aborted calls. Anything still processing, failed, shorter
/// than a second, or without any messages is skipped.
pub fn is_conversation_ready(conversation: &ConversationListItem) -> bool {
    if !conversation.status.is_empty() && conversation.status != "done" {
        tracing::debug!(
            conversation_id = %conversation.conversation_id,
            status = %conversation.status,
            "conversation not done yet"
        );
        return false;
    }

    if conversation.call_successful.as_deref() == Some("failure") {
        tracing::debug!(
            conversation_id = %conversation.conversation_id,
            "conversation failed, skipping analysis"
        );
        return false;
    }

    if conversation.call_duration_secs < 1 {
        tracing::debug!(
            conversation_id = %conversation.conversation_id,
            duration_secs = conversation.call_duration_secs,
            "conversation too short, likely incomplete"
        );
        return false;
    }

    if conversation.message_count < 1 {
        tracing::debug!(
            conversation_id = %conversation.conversation_id,
            message_count = conversation.message_count,
            "conversation has no messages"
        );
        return false;
    }

    true
}
