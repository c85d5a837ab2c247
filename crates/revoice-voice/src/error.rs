use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("voice platform request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("voice platform API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}
