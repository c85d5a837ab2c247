//! Integration tests for the HTTP surface, with both vendor APIs replaced
//! by in-process stub servers.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use revoice_feedback::{FeedbackEngine, LlmConfig, Summarizer};
use revoice_server::background::FeedbackRunner;
use revoice_server::state::AgentStore;
use revoice_server::{app, AppState};
use revoice_voice::{VoiceClient, VoiceConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn voice_platform_stub() -> Router {
    Router::new()
        .route(
            "/convai/conversation/get-signed-url",
            get(|| async { Json(json!({ "signed_url": "wss://platform.example/session?token=abc" })) }),
        )
        .route(
            "/convai/conversations",
            get(|| async {
                Json(json!({
                    "conversations": [{
                        "conversation_id": "conv-1",
                        "agent_id": "agent-1",
                        "status": "done",
                        "call_successful": "success",
                        "call_duration_secs": 75,
                        "message_count": 4,
                        "start_time_unix_secs": 1700000000
                    }]
                }))
            }),
        )
        .route(
            "/convai/conversations/{conversationId}",
            get(|| async {
                Json(json!({
                    "conversation_id": "conv-1",
                    "transcript": [
                        { "role": "agent", "message": "Hello, what brings you here today?" },
                        { "role": "user", "message": "I have been feeling overwhelmed at work lately." },
                        { "role": "agent", "message": "Tell me more about that." },
                        { "role": "user", "message": "My manager keeps adding deadlines." }
                    ],
                    "metadata": { "call_duration_secs": 75 }
                }))
            }),
        )
        .route(
            "/convai/agents/{agentId}",
            get(|| async {
                Json(json!({
                    "conversation_config": {
                        "agent": { "prompt": { "prompt": "You are a supportive listener." } }
                    }
                }))
            }),
        )
}

fn llm_stub() -> Router {
    Router::new().route(
        "/chat/completions",
        post(|| async {
            Json(json!({
                "choices": [{
                    "message": {
                        "content": r#"{"theme":"work stress","emotion":"anxious","next_step":"Practice a short breathing exercise daily."}"#
                    }
                }]
            }))
        }),
    )
}

fn test_state(voice_url: String, llm_url: String) -> Arc<AppState> {
    let mut voice_config = VoiceConfig::new("test-key", "agent-1");
    voice_config.base_url = voice_url;
    voice_config.poll_max_attempts = 2;
    voice_config.poll_delay_ms = 10;

    let mut llm_config = LlmConfig::new("sk-test");
    llm_config.base_url = llm_url;

    let voice = Arc::new(VoiceClient::new(voice_config));
    Arc::new(AppState {
        store: AgentStore::new(),
        voice: voice.clone(),
        engine: FeedbackEngine::new(voice, Summarizer::new(llm_config)),
        runner: FeedbackRunner::new(),
    })
}

async fn setup_app() -> Router {
    let voice_url = spawn_stub(voice_platform_stub()).await;
    let llm_url = spawn_stub(llm_stub()).await;
    app(test_state(voice_url, llm_url))
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Polls the status endpoint until the agent leaves `processing`.
async fn wait_until_ready(app: &Router) -> Value {
    for _ in 0..100 {
        let (_, body) = get_json(app, "/api/agent-status").await;
        if body["status"] == "ready" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("agent never returned to ready");
}

#[tokio::test]
async fn health_reports_agent_status() {
    let app = setup_app().await;

    let (status, body) = get_json(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["agentStatus"], "ready");
    assert!(body["timestamp"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn signed_url_is_passed_through() {
    let app = setup_app().await;

    let (status, body) = get_json(&app, "/api/get-signed-url").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["signedUrl"],
        "wss://platform.example/session?token=abc"
    );
}

#[tokio::test]
async fn signed_url_failure_maps_to_500() {
    let router = Router::new().route(
        "/convai/conversation/get-signed-url",
        get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let voice_url = spawn_stub(router).await;
    let llm_url = spawn_stub(llm_stub()).await;
    let app = app(test_state(voice_url, llm_url));

    let (status, body) = get_json(&app, "/api/get-signed-url").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate signed URL");
    assert!(body["message"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn agent_status_starts_at_initial_state() {
    let app = setup_app().await;

    let (status, body) = get_json(&app, "/api/agent-status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["version"], "1.0");
    assert_eq!(body["conversationsCompleted"], 0);
    assert!(body["fullPrompt"].is_null());
}

#[tokio::test]
async fn unknown_route_lists_available_endpoints() {
    let app = setup_app().await;

    let (status, body) = get_json(&app, "/api/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
    assert_eq!(body["availableEndpoints"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn conversation_ended_runs_a_full_feedback_cycle() {
    let app = setup_app().await;

    let (status, body) = post_json(
        &app,
        "/api/conversation-ended",
        json!({ "currentPrompt": "You are a calm listener." }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Feedback loop started");
    assert_eq!(body["status"], "processing");

    let ready = wait_until_ready(&app).await;
    assert_eq!(ready["version"], "v2");
    assert_eq!(ready["description"], "Enhanced based on conversation analysis");
    assert_eq!(ready["conversationsCompleted"], 1);

    let full_prompt = ready["fullPrompt"].as_str().unwrap();
    assert!(full_prompt.starts_with("You are a calm listener."));
    assert!(full_prompt.contains("[Version 2]"));
    assert!(full_prompt.contains("-> Main theme: work stress"));
}

#[tokio::test]
async fn second_trigger_while_processing_is_acknowledged_without_spawning() {
    // Slow conversation listing keeps the first pass in flight long enough
    // for the second trigger to observe it.
    let slow_voice = Router::new()
        .route(
            "/convai/conversations",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Json(json!({
                    "conversations": [{
                        "conversation_id": "conv-1",
                        "agent_id": "agent-1",
                        "status": "done",
                        "call_successful": "success",
                        "call_duration_secs": 75,
                        "message_count": 4,
                        "start_time_unix_secs": 1700000000
                    }]
                }))
            }),
        )
        .route(
            "/convai/conversations/{conversationId}",
            get(|| async {
                Json(json!({
                    "conversation_id": "conv-1",
                    "transcript": [
                        { "role": "user", "message": "I have been feeling overwhelmed at work lately." }
                    ],
                    "metadata": { "call_duration_secs": 75 }
                }))
            }),
        )
        .route(
            "/convai/agents/{agentId}",
            get(|| async {
                Json(json!({
                    "conversation_config": {
                        "agent": { "prompt": { "prompt": "You are a supportive listener." } }
                    }
                }))
            }),
        );

    let voice_url = spawn_stub(slow_voice).await;
    let llm_url = spawn_stub(llm_stub()).await;
    let app = app(test_state(voice_url, llm_url));

    let (_, first) = post_json(&app, "/api/conversation-ended", json!({})).await;
    assert_eq!(first["message"], "Feedback loop started");

    let (_, second) = post_json(&app, "/api/conversation-ended", json!({})).await;
    assert_eq!(second["message"], "Feedback loop already in progress");
    assert_eq!(second["status"], "processing");

    let ready = wait_until_ready(&app).await;
    assert_eq!(ready["conversationsCompleted"], 1);
}

#[tokio::test]
async fn failed_pass_reverts_to_the_supplied_prompt() {
    // The platform never reports a conversation, so the pass exhausts its
    // polling attempts and fails.
    let empty_voice = Router::new().route(
        "/convai/conversations",
        get(|| async { Json(json!({ "conversations": [] })) }),
    );
    let voice_url = spawn_stub(empty_voice).await;
    let llm_url = spawn_stub(llm_stub()).await;
    let app = app(test_state(voice_url, llm_url));

    let (_, body) = post_json(
        &app,
        "/api/conversation-ended",
        json!({ "currentPrompt": "My handcrafted prompt." }),
    )
    .await;
    assert_eq!(body["message"], "Feedback loop started");

    let ready = wait_until_ready(&app).await;
    assert_eq!(ready["description"], "Processing failed, using previous version");
    assert_eq!(ready["fullPrompt"], "My handcrafted prompt.");
    assert_eq!(ready["conversationsCompleted"], 0);
    assert_eq!(ready["version"], "1.0");
}

#[tokio::test]
async fn current_prompt_reports_base_and_evolved() {
    let app = setup_app().await;

    let (status, body) = get_json(&app, "/api/current-prompt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["basePrompt"], "You are a supportive listener.");
    assert!(body["evolvedPrompt"].is_null());
    assert_eq!(
        body["promptLength"]["base"],
        "You are a supportive listener.".chars().count()
    );
    assert_eq!(body["promptLength"]["evolved"], 0);
}
