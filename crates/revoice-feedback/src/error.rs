use revoice_voice::VoiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("no conversation found to analyze")]
    NoConversation,

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("unexpected LLM response: {0}")]
    Decode(String),
}
