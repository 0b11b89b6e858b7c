//! Docker Compose runner
//!
//! Drives the `docker compose` CLI (or a standalone `docker-compose`):
//! - Manifests are piped on stdin (`-f -`), nothing is written to disk
//! - The stack's working directory becomes `--project-directory`
//! - stdout/stderr are captured and logged at debug level

use async_trait::async_trait;
use keel_core::dto::deploy::RunOutput;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{Result, RunnerError};
use crate::manifest::Manifest;
use crate::runner::{ManifestRunner, ServiceProcess};
use crate::status::parse_ps_output;

/// Program plus leading arguments used to invoke compose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ComposeCommand {
    /// Parse a whitespace separated command line, e.g. `docker compose`
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;

        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    fn display(&self, verb: &[&str]) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.extend(verb.iter().map(|s| s.to_string()));
        parts.join(" ")
    }
}

impl Default for ComposeCommand {
    fn default() -> Self {
        Self {
            program: "docker".to_string(),
            args: vec!["compose".to_string()],
        }
    }
}

/// Manifest runner backed by the compose CLI
#[derive(Debug, Clone, Default)]
pub struct DockerComposeRunner {
    command: ComposeCommand,
}

impl DockerComposeRunner {
    pub fn new(command: ComposeCommand) -> Self {
        Self { command }
    }

    /// Checks that the compose binary is installed and answering
    pub async fn check_available(&self) -> Result<String> {
        let verb = ["version"];
        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .args(verb)
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                command: self.command.display(&verb),
                source,
            })?;

        if !output.status.success() {
            return Err(RunnerError::CommandFailed {
                command: self.command.display(&verb),
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("Compose is available: {}", version);

        Ok(version)
    }

    /// Runs one compose verb with the manifest on stdin
    ///
    /// # Returns
    /// The captured output; a non-zero exit is turned into `CommandFailed`
    async fn run(&self, code: &str, cwd: Option<&str>, verb: &[&str]) -> Result<RunOutput> {
        let command_line = self.command.display(verb);

        let mut command = Command::new(&self.command.program);
        command.args(&self.command.args);
        if let Some(dir) = cwd {
            command.arg("--project-directory").arg(dir);
        }
        command
            .args(["-f", "-"])
            .args(verb)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running `{}` (cwd: {:?})", command_line, cwd);

        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        // Dropping stdin after the write closes the pipe so compose sees EOF
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(code.as_bytes())
                .await
                .map_err(|source| RunnerError::Spawn {
                    command: command_line.clone(),
                    source,
                })?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| RunnerError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        if !stdout.trim().is_empty() {
            debug!("{} stdout: {}", command_line, stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", command_line, stderr.trim());
        }

        if !output.status.success() {
            warn!("`{}` failed with exit code {}", command_line, exit_code);
            return Err(RunnerError::CommandFailed {
                command: command_line,
                exit_code,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(RunOutput {
            command: command_line,
            exit_code,
            stdout,
            stderr,
        })
    }
}

#[async_trait]
impl ManifestRunner for DockerComposeRunner {
    async fn validate_manifest(&self, code: &str, cwd: Option<&str>) -> Result<Manifest> {
        let manifest = Manifest::parse(code)?;

        if let Some(dir) = cwd {
            let is_dir = tokio::fs::metadata(Path::new(dir))
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if !is_dir {
                return Err(RunnerError::invalid_manifest(format!(
                    "working directory {} does not exist",
                    dir
                )));
            }
        }

        Ok(manifest)
    }

    async fn bring_up(&self, code: &str, cwd: Option<&str>) -> Result<RunOutput> {
        self.run(code, cwd, &["up", "--detach", "--remove-orphans"])
            .await
    }

    async fn tear_down(&self, code: &str, cwd: Option<&str>) -> Result<RunOutput> {
        self.run(code, cwd, &["down", "--remove-orphans"]).await
    }

    async fn query_status(&self, code: &str, cwd: Option<&str>) -> Result<Vec<ServiceProcess>> {
        let output = self
            .run(code, cwd, &["ps", "--all", "--format", "json"])
            .await?;
        parse_ps_output(&output.stdout)
    }
}
