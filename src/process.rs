//! Execution of the PMD process.
//!
//! The command is handed to the platform shell, the way the command string is
//! built (see [`crate::command`]). The caller gets a single [`ProcessOutput`]
//! back once the process has finished.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// Errors that can occur when running the analysis tool.
#[derive(Debug)]
pub enum ProcessError {
    /// Shell could not be spawned
    SpawnFailed(String),
    /// Process exited with non-zero status (PMD exits 4 when it finds violations)
    NonZeroExit { code: i32, stderr: String },
    /// Process did not finish in time
    Timeout,
    /// I/O error while collecting output
    IoError(std::io::Error),
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SpawnFailed(cmd) => write!(f, "failed to spawn: {}", cmd),
            Self::NonZeroExit { code, stderr } => {
                write!(f, "process exited with code {}: {}", code, stderr.trim())
            }
            Self::Timeout => write!(f, "process timed out"),
            Self::IoError(e) => write!(f, "process I/O error: {}", e),
        }
    }
}

impl std::error::Error for ProcessError {}

impl From<std::io::Error> for ProcessError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Everything captured from one run of the tool.
#[derive(Debug, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub error: Option<ProcessError>,
}

impl ProcessOutput {
    pub fn failed(error: ProcessError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Runs a command line to completion.
pub trait ProcessExecutor: Send + Sync {
    fn execute(&self, command: &str, timeout: Duration)
    -> impl Future<Output = ProcessOutput> + Send;
}

/// Runs commands through `sh -c` (`cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl ProcessExecutor for ShellExecutor {
    async fn execute(&self, command: &str, timeout: Duration) -> ProcessOutput {
        log::debug!("Spawning: {}", command);

        let child = shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                return ProcessOutput::failed(ProcessError::SpawnFailed(format!(
                    "{}: {}",
                    command, e
                )));
            }
        };

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return ProcessOutput::failed(ProcessError::IoError(e)),
            Err(_) => return ProcessOutput::failed(ProcessError::Timeout),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        let error = if output.status.success() {
            None
        } else {
            Some(ProcessError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.clone(),
            })
        };

        log::debug!(
            "Process finished ({} bytes stdout, {} bytes stderr)",
            stdout.len(),
            stderr.len()
        );

        ProcessOutput {
            stdout,
            stderr,
            error,
        }
    }
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
