//! Google Translate speech provider
//!
//! Uses the public `translate_tts` endpoint behind translate.google.com.
//! The endpoint accepts at most 100 characters per request, so longer text
//! is sent in chunks and the MP3 responses are concatenated in order.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use std::time::Duration;

use crate::chunk::split_text;
use crate::error::{Result, SpeechError};
use crate::mp3;
use crate::provider::{SpeechProvider, SpeechRequest, Speed, check_request};

pub const DEFAULT_BASE_URL: &str = "https://translate.google.com";

/// Maximum characters per request accepted by the endpoint
const MAX_CHARS: usize = 100;

/// `ttsspeed` values for normal and slow speech
const NORMAL_TTS_SPEED: &str = "1";
const SLOW_TTS_SPEED: &str = "0.24";

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Provider for Google Translate text-to-speech
pub struct GoogleTranslateProvider {
    base_url: String,
    client: Client,
}

impl GoogleTranslateProvider {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            client: super::build_client(timeout)?,
        })
    }

    fn tts_speed(speed: Speed) -> &'static str {
        if speed == Speed::SLOW {
            SLOW_TTS_SPEED
        } else {
            NORMAL_TTS_SPEED
        }
    }

    /// Query parameters for one chunk
    fn chunk_query(
        chunk: &str,
        language: &str,
        speed: Speed,
        idx: usize,
        total: usize,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("ie", "UTF-8".to_string()),
            ("q", chunk.to_string()),
            ("tl", language.to_string()),
            ("client", "tw-ob".to_string()),
            ("ttsspeed", Self::tts_speed(speed).to_string()),
            ("total", total.to_string()),
            ("idx", idx.to_string()),
            ("textlen", chunk.chars().count().to_string()),
        ]
    }
}

#[async_trait]
impl SpeechProvider for GoogleTranslateProvider {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        check_request(self, request)?;

        let chunks = split_text(&request.text, MAX_CHARS);
        let total = chunks.len();
        let url = format!("{}/translate_tts", self.base_url);
        log::debug!(
            "Google Translate: {} chunk(s), language {}, speed {}",
            total,
            request.language,
            request.speed
        );

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let query = Self::chunk_query(chunk, &request.language, request.speed, idx, total);

            let response = self
                .client
                .get(&url)
                .header(USER_AGENT, BROWSER_USER_AGENT)
                .query(&query)
                .send()
                .await
                .map_err(|e| SpeechError::ApiError {
                    message: format!("Request failed: {}", e),
                    status_code: None,
                })?;

            let status = response.status();
            log::debug!("Chunk {}/{}: HTTP {}", idx + 1, total, status);

            if !status.is_success() {
                return Err(SpeechError::ApiError {
                    message: format!("HTTP {} on chunk {} of {}", status, idx + 1, total),
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

    fn supports_speed(&self, speed: Speed) -> bool {
        speed == Speed::NORMAL || speed == Speed::SLOW
    }

    fn name(&self) -> &'static str {
        "Google Translate"
    }
}
