use async_trait::async_trait;
use std::fmt;
use std::path::Path;

use crate::error::{Result, SpeechError};

/// Language used when the caller does not pick one
pub const DEFAULT_LANGUAGE: &str = "en";

/// Speaking rate relative to normal speech
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Speed(f32);

impl Speed {
    pub const MIN: f32 = 0.5;
    pub const MAX: f32 = 2.0;
    pub const NORMAL: Speed = Speed(1.0);
    pub const SLOW: Speed = Speed(0.5);

    /// Create a speed, rejecting values outside `MIN..=MAX`
    pub fn new(value: f32) -> Result<Self> {
        if !value.is_finite() || !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(SpeechError::ConfigError(format!(
                "Speed must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// A single synthesis request
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    /// Language code, e.g. "en"
    pub language: String,
    pub speed: Speed,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            speed: Speed::NORMAL,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }
}

/// Speech provider trait - all TTS services implement this
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize text to MP3 bytes
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>>;

    /// Whether the provider can actually honor this speed
    fn supports_speed(&self, speed: Speed) -> bool;

    /// Provider name for display
    fn name(&self) -> &'static str;
}

/// Shared request checks run by every provider before calling out
pub(crate) fn check_request(provider: &dyn SpeechProvider, request: &SpeechRequest) -> Result<()> {
    if request.text.trim().is_empty() {
        return Err(SpeechError::EmptyText);
    }

    if !provider.supports_speed(request.speed) {
        return Err(SpeechError::UnsupportedSpeed {
            provider: provider.name().to_string(),
            speed: request.speed.value(),
        });
    }

    Ok(())
}

/// Synthesize and write the audio to `path`, returning the bytes written.
///
/// The caller owns `path` and is responsible for removing it.
pub async fn synthesize_to_file(
    provider: &dyn SpeechProvider,
    request: &SpeechRequest,
    path: &Path,
) -> Result<Vec<u8>> {
    let audio = provider.synthesize(request).await?;
    tokio::fs::write(path, &audio).await?;
    log::debug!("Wrote {} bytes to {}", audio.len(), path.display());
    Ok(audio)
}
