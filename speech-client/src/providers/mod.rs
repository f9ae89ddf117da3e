pub mod google_translate;
pub mod openai;

#[cfg(any(test, feature = "mock"))]
mod mock;

pub use google_translate::GoogleTranslateProvider;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockProvider;
pub use openai::OpenAiProvider;

use reqwest::Client;
use std::time::Duration;

use crate::error::{Result, SpeechError};
use crate::provider::SpeechProvider;

/// Provider names accepted by [`get_provider`]
pub const AVAILABLE_PROVIDERS: &[&str] = &["google", "openai"];

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything needed to build a provider
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// One of [`AVAILABLE_PROVIDERS`]
    pub name: String,
    pub voice: Option<String>,
    /// Env var holding the API key (providers that need one)
    pub api_key_env: Option<String>,
    pub timeout: Duration,
    /// Override the service URL (local servers, tests)
    pub base_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: "google".to_string(),
            voice: None,
            api_key_env: None,
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
        }
    }
}

/// Create a provider from settings
pub fn get_provider(settings: &ProviderSettings) -> Result<Box<dyn SpeechProvider>> {
    match settings.name.as_str() {
        "google" => Ok(Box::new(GoogleTranslateProvider::new(
            settings.base_url.as_deref(),
            settings.timeout,
        )?)),
        "openai" => {
            let env_var = settings
                .api_key_env
                .as_deref()
                .unwrap_or(openai::DEFAULT_API_KEY_ENV);
            let api_key = std::env::var(env_var).map_err(|_| SpeechError::MissingApiKey {
                provider: "OpenAI".to_string(),
                env_var: env_var.to_string(),
            })?;
            Ok(Box::new(OpenAiProvider::new(
                api_key,
                settings.voice.as_deref(),
                settings.base_url.as_deref(),
                settings.timeout,
            )?))
        }
        other => Err(SpeechError::ConfigError(format!(
            "Unknown speech provider: {}. Available: {}",
            other,
            AVAILABLE_PROVIDERS.join(", ")
        ))),
    }
}

/// HTTP client with the configured request timeout
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SpeechError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}
