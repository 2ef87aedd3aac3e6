//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid voice profile: {0}")]
    InvalidProfile(String),
}
