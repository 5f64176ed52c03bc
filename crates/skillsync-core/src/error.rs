//! Error types for the SkillSync core services

use thiserror::Error;

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the core services
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Profile store error: {0}")]
    ProfileStore(String),

    #[error("Profile not found for user {0}")]
    ProfileNotFound(String),

    #[error("Mentor request failed: {0}")]
    Mentor(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Http(err.to_string())
    }
}
