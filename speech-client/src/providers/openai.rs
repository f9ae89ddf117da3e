//! OpenAI speech provider (`/audio/speech`)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::chunk::split_text;
use crate::error::{Result, SpeechError};
use crate::mp3;
use crate::provider::{DEFAULT_LANGUAGE, SpeechProvider, SpeechRequest, Speed, check_request};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_MODEL: &str = "tts-1";
pub const DEFAULT_VOICE: &str = "alloy";

/// Input limit of the speech endpoint
const MAX_CHARS: usize = 4096;

/// Provider for the OpenAI speech API
pub struct OpenAiProvider {
    api_key: String,
    voice: String,
    base_url: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(
        api_key: String,
        voice: Option<&str>,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            api_key,
            voice: voice.unwrap_or(DEFAULT_VOICE).to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            client: super::build_client(timeout)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct SpeechApiRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
    speed: f32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl SpeechProvider for OpenAiProvider {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        check_request(self, request)?;

        // The endpoint detects the language from the input itself
        if request.language != DEFAULT_LANGUAGE {
            log::warn!(
                "OpenAI ignores the language setting ({}); it is detected from the text",
                request.language
            );
        }
        let chunks = split_text(&request.text, MAX_CHARS);
        let url = format!("{}/audio/speech", self.base_url);

        let mut audio = Vec::new();
        for chunk in &chunks {
            let body = SpeechApiRequest {
                model: DEFAULT_MODEL,
                input: chunk,
                voice: &self.voice,
                response_format: "mp3",
                speed: request.speed.value(),
            };

            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await
                .map_err(|e| SpeechError::ApiError {
                    message: format!("Request failed: {}", e),
                    status_code: None,
                })?;

            let status = response.status();
            log::debug!("OpenAI speech: HTTP {} for {} chars", status, chunk.chars().count());

            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                let message =
                    if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                        error_response.error.message
                    } else {
                        error_text
                    };

                return Err(SpeechError::ApiError {
                    message,
                    status_code: Some(status.as_u16()),
                });
            }

            let bytes = response.bytes().await.map_err(|e| SpeechError::ApiError {
                message: format!("Failed to read response: {}", e),
                status_code: None,
            })?;

            mp3::ensure_mp3(&bytes)?;
            audio.extend_from_slice(&bytes);
        }

        Ok(audio)
    }

    fn supports_speed(&self, _speed: Speed) -> bool {
        // Accepts 0.25-4.0, wider than Speed allows
        true
    }

    fn name(&self) -> &'static str {
        "OpenAI"
    }
}
