use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn narrate_cmd(home: &TempDir) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("narrate").into();
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

fn config_file(home: &TempDir) -> std::path::PathBuf {
    home.path()
        .join(".config")
        .join("cli-programs")
        .join("narrate.toml")
}

// ============================================================================
// CLI Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    let home = TempDir::new().unwrap();
    narrate_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("spoken MP3 audio"))
        .stdout(predicate::str::contains("story"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_story_help_explains_language_option() {
    let home = TempDir::new().unwrap();
    narrate_cmd(&home)
        .args(["story", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--language"))
        .stdout(predicate::str::contains("ignored by OpenAI"));
}

#[test]
fn test_version_displays() {
    let home = TempDir::new().unwrap();
    narrate_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("narrate"));
}

// ============================================================================
// Story Command Tests
// ============================================================================

#[test]
fn test_story_with_empty_text_warns() {
    let home = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();

    narrate_cmd(&home)
        .args(["story", "--title", "My Story", "--text", ""])
        .arg("--out-dir")
        .arg(out_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Please enter some text to generate audio.",
        ));

    assert!(!out_dir.path().join("My Story.mp3").exists());
}

#[test]
fn test_story_with_blank_stdin_warns() {
    let home = TempDir::new().unwrap();

    narrate_cmd(&home)
        .arg("story")
        .write_stdin("  \n\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Warning:"));
}

#[test]
fn test_story_rejects_out_of_range_speed() {
    let home = TempDir::new().unwrap();

    narrate_cmd(&home)
        .args(["story", "--text", "Once upon a time", "--speed", "3.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Speed must be between"));
}

#[test]
fn test_story_rejects_unknown_provider() {
    let home = TempDir::new().unwrap();

    narrate_cmd(&home)
        .args(["story", "--text", "Once upon a time", "--provider", "espeak"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown speech provider"));
}

#[test]
fn test_story_missing_file() {
    let home = TempDir::new().unwrap();

    narrate_cmd(&home)
        .args(["story", "--file", "/nonexistent/story.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_story_text_and_file_conflict() {
    let home = TempDir::new().unwrap();

    narrate_cmd(&home)
        .args(["story", "--text", "Hi", "--file", "story.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ============================================================================
// Batch Command Tests
// ============================================================================

#[test]
fn test_batch_with_no_files() {
    let home = TempDir::new().unwrap();

    narrate_cmd(&home)
        .arg("batch")
        .assert()
        .success()
        .stdout(predicate::str::contains("No files to process"));
}

#[test]
fn test_batch_missing_file() {
    let home = TempDir::new().unwrap();

    narrate_cmd(&home)
        .args(["batch", "/nonexistent/a.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_batch_empty_files_fail_per_item() {
    let home = TempDir::new().unwrap();
    let input = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let a = input.path().join("a.txt");
    let b = input.path().join("b.txt");
    fs::write(&a, "").unwrap();
    fs::write(&b, "   ").unwrap();

    narrate_cmd(&home)
        .arg("batch")
        .arg(&a)
        .arg(&b)
        .arg("--out-dir")
        .arg(out_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("a.txt: Please enter some text"))
        .stderr(predicate::str::contains("b.txt: Please enter some text"))
        .stdout(predicate::str::contains("0 succeeded, 2 failed"));
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_show_defaults() {
    let home = TempDir::new().unwrap();

    narrate_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("narrate.toml"))
        .stdout(predicate::str::contains("provider = \"google\""))
        .stdout(predicate::str::contains("language = \"en\""))
        .stdout(predicate::str::contains("timeout_secs = 60"));
}

#[test]
fn test_config_set_persists() {
    let home = TempDir::new().unwrap();

    narrate_cmd(&home)
        .args(["config", "set", "provider", "openai"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration updated"));

    let content = fs::read_to_string(config_file(&home)).unwrap();
    assert!(content.contains("provider = \"openai\""));

    narrate_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("provider = \"openai\""));
}

#[test]
fn test_config_set_rejects_invalid_values() {
    let home = TempDir::new().unwrap();

    narrate_cmd(&home)
        .args(["config", "set", "speed", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Speed must be between"));

    narrate_cmd(&home)
        .args(["config", "set", "volume", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));

    assert!(!config_file(&home).exists());
}

#[test]
fn test_invalid_config_file_is_reported() {
    let home = TempDir::new().unwrap();
    let path = config_file(&home);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "speed = \"fast\"").unwrap();

    narrate_cmd(&home)
        .args(["story", "--text", "Hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
