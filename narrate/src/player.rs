// Audio playback through an external player command

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// An audio player invoked as `<program> <args...> <file>`
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    program: String,
    args: Vec<String>,
}

impl Player {
    /// Parse a command line such as `ffplay -nodisp -autoexit`
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().context("Player command is empty")?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Play a file and wait for the player to exit
    pub async fn play(&self, path: &Path) -> Result<()> {
        log::debug!("Playing {} with {}", path.display(), self.program);

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .status()
            .await
            .with_context(|| format!("Failed to run player '{}'", self.program))?;

        if !status.success() {
            bail!("{} exited with status: {}", self.program, status);
        }

        Ok(())
    }
}
