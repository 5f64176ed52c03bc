//! Error types for the voice-interview subsystem

use std::time::Duration;
use thiserror::Error;

/// Result type alias for voice operations
pub type VoiceResult<T> = Result<T, VoiceError>;

/// Errors that can occur in the voice-interview subsystem.
///
/// `start` collapses all of these into a boolean failure for the caller; the
/// variants exist so logs and internal handling can tell the taxonomy apart
/// (microphone denied vs. connection failure vs. overlapping start).
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("Connection failure: {0}")]
    Connection(String),

    #[error("Agent handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    #[error("An interview session is already active")]
    AlreadyActive,

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio playback error: {0}")]
    Playback(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<cpal::DevicesError> for VoiceError {
    fn from(err: cpal::DevicesError) -> Self {
        VoiceError::AudioDevice(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for VoiceError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        VoiceError::AudioDevice(err.to_string())
    }
}

impl From<cpal::BuildStreamError> for VoiceError {
    fn from(err: cpal::BuildStreamError) -> Self {
        VoiceError::PermissionDenied(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for VoiceError {
    fn from(err: cpal::PlayStreamError) -> Self {
        VoiceError::AudioDevice(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for VoiceError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        VoiceError::Connection(err.to_string())
    }
}
