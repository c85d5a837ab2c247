//! Voice-agent platform client for revoice.
//!
//! Wraps the conversational-voice platform's REST API: signed-URL issuance
//! for starting browser sessions, conversation listing and detail retrieval,
//! and agent configuration lookup. Conversation records take a moment to
//! become available after a call ends, so the client also provides a bounded
//! polling loop that waits for the latest conversation to be ready.

pub mod client;
pub mod config;
pub mod error;

pub use client::{is_conversation_ready, VoiceClient};
pub use config::VoiceConfig;
pub use error::VoiceError;
