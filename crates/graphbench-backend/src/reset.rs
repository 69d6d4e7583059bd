//! Operating-system reset between benchmark runs.
//!
//! Dropping the page cache and cycling swap gives every run the same cold
//! start. Needs passwordless sudo; the runner treats failures as warnings.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::BackendError;

/// Hook run before a benchmark starts its server.
#[async_trait]
pub trait EnvironmentReset: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Reset the environment.
    async fn reset(&self) -> Result<(), BackendError>;
}

/// Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReset;

#[async_trait]
impl EnvironmentReset for NoopReset {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn reset(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Drops the OS page cache and cycles swap through `sudo -n sh -c ...`.
#[derive(Debug, Clone)]
pub struct DropCaches {
    program: PathBuf,
    prefix: Vec<String>,
    commands: Vec<String>,
}

impl Default for DropCaches {
    fn default() -> Self {
        Self::new()
    }
}

impl DropCaches {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("sudo"),
            prefix: vec!["-n".to_string(), "sh".to_string(), "-c".to_string()],
            commands: vec![
                "sync && echo 3 > /proc/sys/vm/drop_caches".to_string(),
                "swapoff -a && swapon -a".to_string(),
            ],
        }
    }

    /// Run `program prefix... <command>` for each command instead.
    pub fn with_commands(
        program: impl Into<PathBuf>,
        prefix: Vec<String>,
        commands: Vec<String>,
    ) -> Self {
        Self {
            program: program.into(),
            prefix,
            commands,
        }
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

#[async_trait]
impl EnvironmentReset for DropCaches {
    fn name(&self) -> &'static str {
        "drop-caches"
    }

    async fn reset(&self) -> Result<(), BackendError> {
        for command in &self.commands {
            debug!("Running reset command: {}", command);
            let output = Command::new(&self.program)
                .args(&self.prefix)
                .arg(command)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output()
                .await
                .map_err(|e| BackendError::Reset {
                    command: command.clone(),
                    message: e.to_string(),
                })?;

            if !output.status.success() {
                return Err(BackendError::Reset {
                    command: command.clone(),
                    message: format!(
                        "{}: {}",
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    ),
                });
            }
        }
        Ok(())
    }
}
