// narrate configuration management

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use speech_client::{AVAILABLE_PROVIDERS, DEFAULT_LANGUAGE, Speed};
use std::fs;
use std::path::PathBuf;

const DEFAULT_PROVIDER: &str = "google";
const DEFAULT_SPEED: f32 = 1.0;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Keys accepted by `narrate config set`
pub const CONFIG_KEYS: &[&str] = &[
    "provider",
    "language",
    "speed",
    "voice",
    "output_dir",
    "player",
    "timeout_secs",
    "api_key_env",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrateConfig {
    /// Speech provider to use
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Language code passed to the provider
    #[serde(default = "default_language")]
    pub language: String,

    /// Speaking rate relative to normal (0.5 - 2.0)
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Voice name (providers with selectable voices)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    /// Where audio files are saved (None uses the current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Command used to play audio (None uses the platform default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,

    /// Per-request timeout for the speech service
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Env var holding the provider API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for NarrateConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            language: default_language(),
            speed: default_speed(),
            voice: None,
            output_dir: None,
            player: None,
            timeout_secs: default_timeout_secs(),
            api_key_env: None,
        }
    }
}

impl NarrateConfig {
    /// Get the config file path: ~/.config/cli-programs/narrate.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("narrate.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: NarrateConfig =
            toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Set a value by key, validating it first. An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "provider" => {
                if !AVAILABLE_PROVIDERS.contains(&value) {
                    bail!(
                        "Unknown provider: {}. Available: {}",
                        value,
                        AVAILABLE_PROVIDERS.join(", ")
                    );
                }
                self.provider = value.to_string();
            }
            "language" => {
                if value.trim().is_empty() {
                    bail!("Language cannot be empty");
                }
                self.language = value.trim().to_string();
            }
            "speed" => {
                let speed: f32 = value
                    .parse()
                    .with_context(|| format!("Invalid speed: {}", value))?;
                Speed::new(speed)?;
                self.speed = speed;
            }
            "voice" => self.voice = optional(value),
            "output_dir" => self.output_dir = optional(value).map(PathBuf::from),
            "player" => self.player = optional(value),
            "timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout: {}", value))?;
                if secs == 0 {
                    bail!("timeout_secs must be greater than 0");
                }
                self.timeout_secs = secs;
            }
            "api_key_env" => self.api_key_env = optional(value),
            _ => bail!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Player command, falling back to the platform default
    pub fn player_command(&self) -> String {
        self.player.clone().unwrap_or_else(default_player)
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn default_player() -> String {
    if cfg!(target_os = "macos") {
        "afplay".to_string()
    } else {
        "ffplay -nodisp -autoexit -loglevel quiet".to_string()
    }
}
