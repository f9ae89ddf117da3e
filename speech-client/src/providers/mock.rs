use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{Result, SpeechError};
use crate::provider::{SpeechProvider, SpeechRequest, Speed, check_request};

enum Behavior {
    Succeed,
    Fail(String),
    FailWhenContains { needle: String, message: String },
}

/// In-memory provider for tests. Records every request it receives.
pub struct MockProvider {
    behavior: Behavior,
    requests: Mutex<Vec<SpeechRequest>>,
}

impl MockProvider {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns an ID3-tagged stream carrying the request text
    pub fn always_succeeds() -> Self {
        Self::with_behavior(Behavior::Succeed)
    }

    pub fn always_fails(message: &str) -> Self {
        Self::with_behavior(Behavior::Fail(message.to_string()))
    }

    /// Fails only for requests whose text contains `needle`
    pub fn fails_when_text_contains(needle: &str, message: &str) -> Self {
        Self::with_behavior(Behavior::FailWhenContains {
            needle: needle.to_string(),
            message: message.to_string(),
        })
    }

    /// Number of synthesize calls so far
    pub fn calls(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        check_request(self, request)?;

        let failure = match &self.behavior {
            Behavior::Succeed => None,
            Behavior::Fail(message) => Some(message.clone()),
            Behavior::FailWhenContains { needle, message } => {
                request.text.contains(needle.as_str()).then(|| message.clone())
            }
        };

        match failure {
            Some(message) => Err(SpeechError::ApiError {
                message,
                status_code: None,
            }),
            None => {
                let mut audio = b"ID3".to_vec();
                audio.extend_from_slice(request.text.as_bytes());
                Ok(audio)
            }
        }
    }

    fn supports_speed(&self, _speed: Speed) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}
