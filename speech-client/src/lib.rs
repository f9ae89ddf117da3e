//! Shared text-to-speech client library
//!
//! Wraps remote speech synthesis services behind the [`SpeechProvider`] trait.
//! Every provider takes a [`SpeechRequest`] and returns MP3 bytes.

pub mod chunk;
pub mod error;
pub mod mp3;
pub mod provider;
pub mod providers;

pub use error::{Result, SpeechError};
pub use provider::{DEFAULT_LANGUAGE, SpeechProvider, SpeechRequest, Speed, synthesize_to_file};
pub use providers::{AVAILABLE_PROVIDERS, ProviderSettings, get_provider};
