use thiserror::Error;

/// Errors returned by speech providers
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("No text to synthesize")]
    EmptyText,

    #[error("API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    #[error("{provider} API key not found (set {env_var})")]
    MissingApiKey { provider: String, env_var: String },

    #[error("{provider} cannot speak at speed {speed}")]
    UnsupportedSpeed { provider: String, speed: f32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SpeechError>;
