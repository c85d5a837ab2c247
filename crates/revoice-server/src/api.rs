//! API handlers for the revoice server.

use crate::AppState;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use revoice_types::AgentStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// The routes this server answers, reported by the 404 handler.
const AVAILABLE_ENDPOINTS: [&str; 5] = [
    "GET /api/get-signed-url",
    "POST /api/conversation-ended",
    "GET /api/agent-status",
    "GET /api/current-prompt",
    "GET /api/health",
];

/// API error type mapping to HTTP status codes.
///
/// Vendor failures all surface as 500 with a stable `error` label and the
/// upstream message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{context}: {message}")]
    Internal {
        context: &'static str,
        message: String,
    },
}

impl ApiError {
    fn internal(context: &'static str, message: impl ToString) -> Self {
        Self::Internal {
            context,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let Self::Internal { context, message } = self;

        let body = Json(serde_json::json!({
            "error": context,
            "message": message,
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Response body for signed-URL issuance.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignedUrlResponse {
    #[serde(rename = "signedUrl")]
    pub signed_url: String,
}

/// Request body for the conversation-ended trigger.
#[derive(Debug, Default, Deserialize)]
pub struct ConversationEndedRequest {
    /// The prompt to improve upon. Absent on the first conversation; later
    /// triggers send back the full evolved prompt.
    #[serde(rename = "currentPrompt")]
    pub current_prompt: Option<String>,
}

/// Immediate acknowledgement for the conversation-ended trigger.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationEndedResponse {
    pub message: String,
    pub status: AgentStatus,
}

/// Response body for agent status inspection.
#[derive(Debug, Serialize, Deserialize)]
pub struct AgentStatusResponse {
    pub status: AgentStatus,
    pub version: String,
    pub description: String,
    #[serde(rename = "conversationsCompleted")]
    pub conversations_completed: u64,
    #[serde(rename = "fullPrompt")]
    pub full_prompt: Option<String>,
}

/// Character counts reported alongside the prompts.
#[derive(Debug, Serialize, Deserialize)]
pub struct PromptLength {
    pub base: usize,
    pub evolved: usize,
}

/// Response body for the prompt debug endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentPromptResponse {
    #[serde(rename = "basePrompt")]
    pub base_prompt: String,
    #[serde(rename = "evolvedPrompt")]
    pub evolved_prompt: Option<String>,
    #[serde(rename = "promptLength")]
    pub prompt_length: PromptLength,
}

/// Handler for `GET /api/get-signed-url`.
///
/// Issues a signed URL for starting a conversation with the agent.
pub async fn get_signed_url_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<SignedUrlResponse>, ApiError> {
    let signed_url = state
        .voice
        .signed_url()
        .await
        .map_err(|e| ApiError::internal("Failed to generate signed URL", e))?;

    Ok(Json(SignedUrlResponse { signed_url }))
}

/// Handler for `POST /api/conversation-ended`.
///
/// Acknowledges immediately and processes the conversation in the
/// background. A trigger that arrives while a pass is already running is
/// acknowledged without spawning a duplicate.
pub async fn conversation_ended_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ConversationEndedRequest>,
) -> Json<ConversationEndedResponse> {
    let current_prompt = payload.current_prompt;

    let started = state.runner.trigger(state.clone(), current_prompt);
    let message = if started {
        tracing::info!("conversation ended, feedback pass started");
        "Feedback loop started"
    } else {
        "Feedback loop already in progress"
    };

    Json(ConversationEndedResponse {
        message: message.to_string(),
        status: state.store.snapshot().status,
    })
}

/// Handler for `GET /api/agent-status`.
pub async fn agent_status_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<AgentStatusResponse> {
    let snapshot = state.store.snapshot();

    Json(AgentStatusResponse {
        status: snapshot.status,
        version: snapshot.version,
        description: snapshot.description,
        conversations_completed: snapshot.conversations_completed,
        full_prompt: snapshot.full_prompt,
    })
}

/// Handler for `GET /api/current-prompt`.
///
/// Debug endpoint: fetches the configured base prompt live from the
/// platform and reports it next to the evolved prompt.
pub async fn current_prompt_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<CurrentPromptResponse>, ApiError> {
    let info = state
        .voice
        .agent_info()
        .await
        .map_err(|e| ApiError::internal("Failed to get current prompt", e))?;

    let base_prompt = info.base_prompt().unwrap_or("No prompt found").to_string();
    let evolved_prompt = state.store.snapshot().full_prompt;

    let prompt_length = PromptLength {
        base: base_prompt.chars().count(),
        evolved: evolved_prompt
            .as_deref()
            .map(|prompt| prompt.chars().count())
            .unwrap_or(0),
    };

    Ok(Json(CurrentPromptResponse {
        base_prompt,
        evolved_prompt,
        prompt_length,
    }))
}

/// Handler for `GET /api/health`.
pub async fn health_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "agentStatus": state.store.snapshot().status,
    }))
}

/// Fallback handler: 404 with the list of valid endpoints.
pub async fn not_found_handler() -> Response {
    let body = Json(serde_json::json!({
        "error": "Endpoint not found",
        "availableEndpoints": AVAILABLE_ENDPOINTS,
    }));

    (StatusCode::NOT_FOUND, body).into_response()
}
