//! Request orchestration: single stories and batches of text files
//!
//! A [`Session`] serves exactly one request. It owns a scratch directory
//! that the speech provider writes into; the directory is removed when the
//! session is dropped, whether the request succeeded or not.

use anyhow::Context;
use speech_client::mp3::MIME_TYPE;
use speech_client::{SpeechError, SpeechProvider, SpeechRequest, Speed, synthesize_to_file};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;

use crate::naming;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please enter some text to generate audio.")]
    EmptyText,

    #[error("{0}")]
    Synthesis(#[from] SpeechError),

    #[error("File is not valid UTF-8 text: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("Another file in this batch already produced {}", naming::download_name(.0))]
    DuplicateIdentifier(String),

    #[error("Failed to create temporary directory: {0}")]
    Scratch(#[source] std::io::Error),
}

impl SessionError {
    /// User-correctable input problems, reported as warnings
    pub fn is_warning(&self) -> bool {
        matches!(self, SessionError::EmptyText)
    }
}

/// Text to be spoken, with the name its audio will carry
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub identifier: String,
    pub content: String,
}

impl TextItem {
    /// Rejects blank content
    pub fn new(identifier: String, content: String) -> Result<Self, SessionError> {
        if content.trim().is_empty() {
            return Err(SessionError::EmptyText);
        }
        Ok(Self {
            identifier,
            content,
        })
    }
}

/// Synthesized audio for one text item
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub identifier: String,
    pub bytes: Vec<u8>,
    /// Copy inside the session scratch directory, valid while the session lives
    pub scratch_path: PathBuf,
}

impl AudioArtifact {
    pub fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    pub fn file_name(&self) -> String {
        naming::download_name(&self.identifier)
    }

    /// Save the audio into `dir` as `<identifier>.mp3`
    pub async fn save_to(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let path = dir.join(self.file_name());
        tokio::fs::write(&path, &self.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// A single story: title plus body text
#[derive(Debug, Clone)]
pub struct StoryRequest {
    pub title: String,
    pub text: String,
}

impl StoryRequest {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// One uploaded text file
#[derive(Debug, Clone)]
pub struct BatchFile {
    /// Original file name, e.g. `chapter1.txt`
    pub name: String,
    pub data: Vec<u8>,
}

/// Ordered collection of uploaded files
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    pub files: Vec<BatchFile>,
}

impl BatchRequest {
    /// Read every file up front, failing if any is missing or unreadable
    pub async fn from_paths(paths: &[PathBuf]) -> anyhow::Result<Self> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            let data = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            files.push(BatchFile { name, data });
        }
        Ok(Self { files })
    }
}

/// Result for one file of a batch
#[derive(Debug)]
pub struct ItemOutcome {
    /// Source file name
    pub source: String,
    pub result: Result<AudioArtifact, SessionError>,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Drives the speech provider for one request
pub struct Session<'a> {
    provider: &'a dyn SpeechProvider,
    language: String,
    speed: Speed,
    scratch: TempDir,
}

impl<'a> Session<'a> {
    pub fn new(
        provider: &'a dyn SpeechProvider,
        language: &str,
        speed: Speed,
    ) -> Result<Self, SessionError> {
        let scratch = tempfile::Builder::new()
            .prefix("narrate-")
            .tempdir()
            .map_err(SessionError::Scratch)?;

        Ok(Self {
            provider,
            language: language.to_string(),
            speed,
            scratch,
        })
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Single-item flow: validate, then synthesize
    pub async fn generate_story(&self, request: &StoryRequest) -> Result<AudioArtifact, SessionError> {
        let identifier = naming::identifier_from_title(&request.title);
        let item = TextItem::new(identifier, request.text.clone())?;
        self.synthesize(&item).await
    }

    /// Batch flow: every file is processed in order and gets its own outcome.
    /// A failing file never stops the files after it.
    pub async fn process_batch(&self, request: &BatchRequest) -> Vec<ItemOutcome> {
        let mut seen = HashSet::new();
        let mut outcomes = Vec::with_capacity(request.files.len());

        for (i, file) in request.files.iter().enumerate() {
            log::info!(
                "Processing {} ({}/{})",
                file.name,
                i + 1,
                request.files.len()
            );

            let result = self.process_file(file, &mut seen).await;
            if let Err(e) = &result {
                log::warn!("{} failed: {}", file.name, e);
            }

            outcomes.push(ItemOutcome {
                source: file.name.clone(),
                result,
            });
        }

        outcomes
    }

    async fn process_file(
        &self,
        file: &BatchFile,
        seen: &mut HashSet<String>,
    ) -> Result<AudioArtifact, SessionError> {
        let identifier = naming::identifier_from_filename(&file.name);
        if seen.contains(&identifier) {
            return Err(SessionError::DuplicateIdentifier(identifier));
        }

        let content = std::str::from_utf8(&file.data)?;
        let item = TextItem::new(identifier, content.to_string())?;
        let artifact = self.synthesize(&item).await?;

        // Only produced audio claims its name
        seen.insert(artifact.identifier.clone());
        Ok(artifact)
    }

    async fn synthesize(&self, item: &TextItem) -> Result<AudioArtifact, SessionError> {
        let scratch_path = self
            .scratch
            .path()
            .join(naming::download_name(&item.identifier));
        let request = SpeechRequest::new(item.content.as_str())
            .with_language(self.language.as_str())
            .with_speed(self.speed);

        log::debug!(
            "Synthesizing '{}' with {} ({} chars)",
            item.identifier,
            self.provider.name(),
            item.content.chars().count()
        );
        let bytes = synthesize_to_file(self.provider, &request, &scratch_path).await?;

        Ok(AudioArtifact {
            identifier: item.identifier.clone(),
            bytes,
            scratch_path,
        })
    }
}
