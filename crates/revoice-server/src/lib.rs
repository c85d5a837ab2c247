//! Revoice server library logic.
//!
//! Bridges a conversational-voice agent platform with an LLM to rewrite the
//! agent's system prompt after each completed conversation. The HTTP surface
//! hands out signed session URLs, accepts conversation-ended triggers, and
//! reports the in-memory agent state.

pub mod api;
pub mod background;
pub mod config;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use background::FeedbackRunner;
use revoice_feedback::FeedbackEngine;
use revoice_voice::VoiceClient;
use state::AgentStore;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Maximum request body size (2 MiB). Protects against OOM from oversized
/// payloads; evolved prompts are capped far below this.
const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Application state shared across all request handlers.
pub struct AppState {
    /// In-memory agent state.
    pub store: AgentStore,
    /// Voice platform client.
    pub voice: Arc<VoiceClient>,
    /// Feedback pass engine.
    pub engine: FeedbackEngine,
    /// Single-flight background task handle.
    pub runner: FeedbackRunner,
}

impl AppState {
    /// Wires up the application state from configuration.
    pub fn from_config(config: &config::Config) -> Self {
        let voice = Arc::new(VoiceClient::new(config.voice.clone()));
        let engine = FeedbackEngine::new(
            voice.clone(),
            revoice_feedback::Summarizer::new(config.llm.clone()),
        );

        Self {
            store: AgentStore::new(),
            voice,
            engine,
            runner: FeedbackRunner::new(),
        }
    }
}

/// Builds the application router with all routes.
pub fn app(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/api/get-signed-url", get(api::get_signed_url_handler))
        .route(
            "/api/conversation-ended",
            post(api::conversation_ended_handler),
        )
        .route("/api/agent-status", get(api::agent_status_handler))
        .route("/api/current-prompt", get(api::current_prompt_handler))
        .route("/api/health", get(api::health_handler));

    // Serve the browser client if a build exists. The conversation UI is the
    // vendor's JavaScript SDK, so it ships as static files, not Rust.
    // Configured via REVOICE_CLIENT_DIR; defaults to "client/dist".
    let client_dir =
        std::env::var("REVOICE_CLIENT_DIR").unwrap_or_else(|_| "client/dist".to_string());
    let router = if std::path::Path::new(&client_dir).join("index.html").exists() {
        tracing::info!(path = %client_dir, "serving client static files at /client");
        let index = format!("{}/index.html", client_dir);
        router.nest_service(
            "/client",
            ServeDir::new(&client_dir).fallback(ServeFile::new(index)),
        )
    } else {
        tracing::info!(path = %client_dir, "client directory not found, skipping static file serving");
        router
    };

    router
        .fallback(api::not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(state))
}
