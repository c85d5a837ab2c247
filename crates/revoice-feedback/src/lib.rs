//! Conversation feedback loop for revoice.
//!
//! After each completed conversation, the feedback pass fetches the
//! transcript from the voice platform, asks an LLM for a short structured
//! summary, and composes the next evolved prompt: the configured base text
//! plus a single version block built from a structured [`PromptVersion`]
//! record. Prompt growth is capped, so repeated passes never accumulate
//! unbounded text.
//!
//! The summary step is deliberately simple and is the place to customize
//! when adapting this backend to a different agent.

pub mod config;
pub mod engine;
pub mod error;
pub mod prompt;
pub mod summarizer;

pub use config::LlmConfig;
pub use engine::{FeedbackEngine, FeedbackOutcome};
pub use error::FeedbackError;
pub use prompt::{pick_top_quotes, EvolvedPrompt, MAX_PROMPT_CHARS};
pub use summarizer::{SessionSummary, Summarizer};
