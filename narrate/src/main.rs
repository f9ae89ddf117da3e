// narrate - Turn stories and text files into spoken MP3 audio

mod config;
mod naming;
mod player;
mod session;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::NarrateConfig;
use indicatif::{ProgressBar, ProgressStyle};
use player::Player;
use session::{AudioArtifact, BatchRequest, ItemOutcome, Session, StoryRequest};
use speech_client::{ProviderSettings, Speed};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::AsyncReadExt;

#[derive(Parser, Debug)]
#[command(name = "narrate")]
#[command(about = "Turn stories and text files into spoken MP3 audio", long_about = None)]
#[command(version)]
struct Args {
    /// Enable debug output
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate audio for a single story
    Story {
        /// Story title, used as the audio file name
        #[arg(short, long, default_value = naming::DEFAULT_TITLE)]
        title: String,

        /// Story text (reads stdin when neither --text nor --file is given)
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the story text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        options: SynthesisOptions,
    },
    /// Generate audio for every text file given, in order
    Batch {
        /// Text files to convert
        files: Vec<PathBuf>,

        #[command(flatten)]
        options: SynthesisOptions,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
struct SynthesisOptions {
    /// Speaking rate relative to normal (0.5 - 2.0)
    #[arg(short, long)]
    speed: Option<f32>,

    /// Speech provider (google, openai)
    #[arg(long)]
    provider: Option<String>,

    /// Language code, e.g. "en" (ignored by OpenAI)
    #[arg(short, long)]
    language: Option<String>,

    /// Directory to save audio files in
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Play each result after generating it
    #[arg(long)]
    play: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value (empty value clears optional keys)
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
}

/// Config merged with command-line overrides
struct Resolved {
    provider: ProviderSettings,
    language: String,
    speed: Speed,
    out_dir: PathBuf,
    player: Option<Player>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match args.command {
        Commands::Config { action } => handle_config_command(action).map(|_| ExitCode::SUCCESS),
        Commands::Story {
            title,
            text,
            file,
            options,
        } => {
            let config = NarrateConfig::load().context("Failed to load configuration")?;
            let resolved = resolve(&config, &options)?;
            let text = read_story_text(text, file).await?;
            run_story(StoryRequest::new(title, text), &resolved).await
        }
        Commands::Batch { files, options } => {
            let config = NarrateConfig::load().context("Failed to load configuration")?;
            let resolved = resolve(&config, &options)?;
            run_batch(&files, &resolved).await
        }
    }
}

fn resolve(config: &NarrateConfig, options: &SynthesisOptions) -> Result<Resolved> {
    let speed = Speed::new(options.speed.unwrap_or(config.speed))?;

    let provider = ProviderSettings {
        name: options
            .provider
            .clone()
            .unwrap_or_else(|| config.provider.clone()),
        voice: config.voice.clone(),
        api_key_env: config.api_key_env.clone(),
        timeout: Duration::from_secs(config.timeout_secs),
        base_url: None,
    };

    let player = if options.play {
        Some(Player::from_command_line(&config.player_command())?)
    } else {
        None
    };

    let out_dir = options
        .out_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(Resolved {
        provider,
        language: options
            .language
            .clone()
            .unwrap_or_else(|| config.language.clone()),
        speed,
        out_dir,
        player,
    })
}

async fn read_story_text(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(path) = file {
        if !path.exists() {
            bail!("Input file not found: {}", path.display());
        }
        return tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    if std::io::stdin().is_terminal() {
        bail!("No story text given. Use --text, --file, or pipe text on stdin");
    }

    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("Failed to read story text from stdin")?;
    Ok(text)
}

async fn run_story(request: StoryRequest, resolved: &Resolved) -> Result<ExitCode> {
    let provider = speech_client::get_provider(&resolved.provider)?;
    log::debug!(
        "Provider: {}, language: {}, speed: {}",
        provider.name(),
        resolved.language,
        resolved.speed
    );

    let session = Session::new(provider.as_ref(), &resolved.language, resolved.speed)?;
    log::debug!("Scratch directory: {}", session.scratch_dir().display());

    let pb = spinner("Generating audio...");
    let result = session.generate_story(&request).await;
    pb.finish_and_clear();

    match result {
        Ok(artifact) => {
            present(&artifact, resolved).await?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_warning() => {
            eprintln!("Warning: {}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("An error occurred: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_batch(files: &[PathBuf], resolved: &Resolved) -> Result<ExitCode> {
    if files.is_empty() {
        println!("No files to process.");
        return Ok(ExitCode::SUCCESS);
    }

    let request = BatchRequest::from_paths(files).await?;
    let provider = speech_client::get_provider(&resolved.provider)?;
    let session = Session::new(provider.as_ref(), &resolved.language, resolved.speed)?;

    let pb = spinner(&format!("Processing {} stories...", request.files.len()));
    let outcomes = session.process_batch(&request).await;
    pb.finish_and_clear();

    log::debug!(
        "{} of {} items synthesized",
        outcomes.iter().filter(|o| o.is_success()).count(),
        outcomes.len()
    );
    let failed = deliver_outcomes(&outcomes, resolved).await;

    println!();
    println!(
        "{} succeeded, {} failed",
        outcomes.len() - failed,
        failed
    );

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Present every successful item in order. A save failure only fails its
/// own item. Returns the number of failed items.
async fn deliver_outcomes(outcomes: &[ItemOutcome], resolved: &Resolved) -> usize {
    let mut failed = 0;
    for outcome in outcomes {
        let delivered = match &outcome.result {
            Ok(artifact) => {
                println!("{}", artifact.identifier);
                present(artifact, resolved).await
            }
            Err(e) => Err(anyhow::anyhow!("{}", e)),
        };
        if let Err(e) = delivered {
            eprintln!("{}: {:#}", outcome.source, e);
            failed += 1;
        }
    }
    failed
}

/// Save the artifact (download) and optionally play it (preview)
async fn present(artifact: &AudioArtifact, resolved: &Resolved) -> Result<()> {
    let saved = artifact.save_to(&resolved.out_dir).await?;
    println!(
        "  Saved {} ({}, {})",
        saved.display(),
        artifact.mime_type(),
        format_size(artifact.bytes.len())
    );

    if let Some(player) = &resolved.player {
        if let Err(e) = player.play(&artifact.scratch_path).await {
            eprintln!("  Warning: playback failed: {:#}", e);
        }
    }

    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = NarrateConfig::load()?;
            println!("Config file: {}", NarrateConfig::config_path()?.display());
            println!();
            println!("provider = \"{}\"", config.provider);
            println!("language = \"{}\"", config.language);
            println!("speed = {}", config.speed);
            match &config.voice {
                Some(voice) => println!("voice = \"{}\"", voice),
                None => println!("voice = (provider default)"),
            }
            match &config.output_dir {
                Some(dir) => println!("output_dir = \"{}\"", dir.display()),
                None => println!("output_dir = (current directory)"),
            }
            println!("player = \"{}\"", config.player_command());
            println!("timeout_secs = {}", config.timeout_secs);
            if let Some(env_var) = &config.api_key_env {
                println!("api_key_env = \"{}\"", env_var);
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = NarrateConfig::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("Configuration updated");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn options() -> SynthesisOptions {
        SynthesisOptions {
            speed: None,
            provider: None,
            language: None,
            out_dir: None,
            play: false,
        }
    }

    #[test]
    fn test_resolve_uses_config_defaults() {
        let resolved = resolve(&NarrateConfig::default(), &options()).unwrap();
        assert_eq!(resolved.provider.name, "google");
        assert_eq!(resolved.language, "en");
        assert_eq!(resolved.speed, Speed::NORMAL);
        assert_eq!(resolved.out_dir, PathBuf::from("."));
        assert_eq!(resolved.provider.timeout, Duration::from_secs(60));
        assert!(resolved.player.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = NarrateConfig::default();
        config.output_dir = Some(PathBuf::from("/from/config"));
        config.player = Some("mpv".to_string());

        let opts = SynthesisOptions {
            speed: Some(0.5),
            provider: Some("openai".to_string()),
            language: Some("de".to_string()),
            out_dir: Some(PathBuf::from("/from/flag")),
            play: true,
        };
        let resolved = resolve(&config, &opts).unwrap();

        assert_eq!(resolved.provider.name, "openai");
        assert_eq!(resolved.language, "de");
        assert_eq!(resolved.speed, Speed::SLOW);
        assert_eq!(resolved.out_dir, Path::new("/from/flag"));
        assert_eq!(resolved.player, Some(Player::from_command_line("mpv").unwrap()));
    }

    #[test]
    fn test_out_of_range_speed_is_rejected() {
        let opts = SynthesisOptions {
            speed: Some(3.0),
            ..options()
        };
        let err = resolve(&NarrateConfig::default(), &opts).err().unwrap();
        assert!(err.to_string().contains("Speed must be between"));
    }

    fn artifact(identifier: &str) -> AudioArtifact {
        AudioArtifact {
            identifier: identifier.to_string(),
            bytes: b"ID3audio".to_vec(),
            scratch_path: PathBuf::from(format!("/nonexistent/{}.mp3", identifier)),
        }
    }

    fn outcome(source: &str, identifier: &str) -> ItemOutcome {
        ItemOutcome {
            source: source.to_string(),
            result: Ok(artifact(identifier)),
        }
    }

    #[tokio::test]
    async fn test_deliver_saves_every_item() {
        let out_dir = tempfile::TempDir::new().unwrap();
        let mut resolved = resolve(&NarrateConfig::default(), &options()).unwrap();
        resolved.out_dir = out_dir.path().to_path_buf();

        let outcomes = vec![outcome("a.txt", "a"), outcome("b.txt", "b")];
        let failed = deliver_outcomes(&outcomes, &resolved).await;

        assert_eq!(failed, 0);
        assert!(out_dir.path().join("a.mp3").exists());
        assert!(out_dir.path().join("b.mp3").exists());
    }

    #[tokio::test]
    async fn test_save_failure_fails_only_its_item() {
        let out_dir = tempfile::TempDir::new().unwrap();
        // A directory where a.mp3 should go makes that one write fail
        std::fs::create_dir(out_dir.path().join("a.mp3")).unwrap();

        let mut resolved = resolve(&NarrateConfig::default(), &options()).unwrap();
        resolved.out_dir = out_dir.path().to_path_buf();

        let outcomes = vec![
            outcome("a.txt", "a"),
            ItemOutcome {
                source: "b.txt".to_string(),
                result: Err(session::SessionError::EmptyText),
            },
            outcome("c.txt", "c"),
        ];
        let failed = deliver_outcomes(&outcomes, &resolved).await;

        assert_eq!(failed, 2);
        assert_eq!(std::fs::read(out_dir.path().join("c.mp3")).unwrap(), b"ID3audio");
    }

    #[tokio::test]
    async fn test_unusable_out_dir_fails_every_item() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let mut resolved = resolve(&NarrateConfig::default(), &options()).unwrap();
        resolved.out_dir = blocker;

        let outcomes = vec![outcome("a.txt", "a"), outcome("b.txt", "b")];
        assert_eq!(deliver_outcomes(&outcomes, &resolved).await, 2);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
