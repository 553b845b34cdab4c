//! External commands run after the project is written
//!
//! Formatting with Prettier and `git init` are best-effort: callers report a
//! failure as a warning and keep going.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Prettier may have to be downloaded by npx on first use
const FORMAT_TIMEOUT: Duration = Duration::from_secs(120);

const GIT_TIMEOUT: Duration = Duration::from_secs(15);

/// A command line run inside the new project directory
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    /// Display name for user-facing messages
    pub display_name: &'static str,
    pub program: &'static str,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl ExternalCommand {
    /// `npx --yes prettier --write` over the project using its `.prettierrc`
    pub fn prettier(root: &Path) -> Self {
        Self {
            display_name: "Prettier",
            program: "npx",
            args: vec![
                "--yes".to_string(),
                "prettier".to_string(),
                "--log-level".to_string(),
                "silent".to_string(),
                "--config".to_string(),
                root.join(".prettierrc").display().to_string(),
                "--write".to_string(),
                root.display().to_string(),
            ],
            timeout: FORMAT_TIMEOUT,
        }
    }

    /// `git init --quiet`
    pub fn git_init() -> Self {
        Self {
            display_name: "git",
            program: "git",
            args: vec!["init".to_string(), "--quiet".to_string()],
            timeout: GIT_TIMEOUT,
        }
    }

    /// Get the command string as a user would type it
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command in `cwd`, failing on spawn errors, a non-zero exit
    /// status or the timeout
    pub async fn run(&self, cwd: &Path) -> Result<()> {
        let cmd = self.command_line();
        tracing::debug!(command = %cmd, cwd = %cwd.display(), "running");

        let output = TokioCommand::new(self.program)
            .args(&self.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.timeout, output).await {
            Ok(result) => result.with_context(|| format!("Failed to run: {}", cmd))?,
            Err(_) => {
                anyhow::bail!(
                    "{} timed out after {} seconds. You can run it manually:\n{}",
                    self.display_name,
                    self.timeout.as_secs(),
                    cmd
                );
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} failed with exit code: {}\n{}",
                self.display_name,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        Ok(())
    }
}
