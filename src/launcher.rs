//! Target process lifecycle.
//!
//! Spawns one fresh instance of the service under test per probe step and
//! tears it down unconditionally when the step ends. The target runs as a
//! child OS process speaking JSON-RPC over its piped stdio.

use std::time::Duration;

use tokio::io::BufReader;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use crate::config::TargetConfig;
use crate::errors::ProbeError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Bounded wait when draining stderr after a failed step.
const STDERR_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Truncation limit for the captured stderr tail.
const STDERR_TAIL_LIMIT: usize = 2000;

// ─── TargetProcess ───────────────────────────────────────────────────────────

/// One spawned instance of the service under test and its stdio streams.
///
/// Owned exclusively by the step that spawned it; torn down before the step
/// returns.
pub struct TargetProcess {
    /// Display form of the launched command, for logs and reports.
    command: String,
    /// The child process handle.
    child: Child,
    /// Request channel; dropped on shutdown to signal the target to stop.
    stdin: Option<ChildStdin>,
    /// Response channel, line-buffered.
    stdout: BufReader<ChildStdout>,
    /// Captured for post-mortem diagnostics on failed steps.
    stderr: Option<ChildStderr>,
}

impl TargetProcess {
    /// Start a fresh target instance with all three stdio streams piped.
    pub fn spawn(config: &TargetConfig) -> Result<TargetProcess, ProbeError> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args);

        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        if let Some(dir) = &config.cwd {
            cmd.current_dir(dir);
        }

        // Wire stdio for JSON-RPC
        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        // Backstop: a panicking step must not leak a live target
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| ProbeError::Launch {
            command: config.command_display(),
            reason: format!("{e}"),
        })?;

        let stdin = child.stdin.take().ok_or(ProbeError::Launch {
            command: config.command_display(),
            reason: "failed to capture stdin".into(),
        })?;

        let stdout = child.stdout.take().ok_or(ProbeError::Launch {
            command: config.command_display(),
            reason: "failed to capture stdout".into(),
        })?;

        let stderr = child.stderr.take();

        tracing::debug!(
            command = %config.command_display(),
            pid = ?child.id(),
            "target spawned"
        );

        Ok(TargetProcess {
            command: config.command_display(),
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            stderr,
        })
    }

    /// Display form of the launched command.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Request channel, if the target has not been shut down yet.
    pub fn stdin(&mut self) -> Option<&mut ChildStdin> {
        self.stdin.as_mut()
    }

    /// Buffered response channel.
    pub fn stdout(&mut self) -> &mut BufReader<ChildStdout> {
        &mut self.stdout
    }

    /// Check if the target process is still running.
    pub fn is_alive(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,     // Still running
            Ok(Some(_)) => false, // Exited
            Err(_) => false,      // Error checking, assume dead
        }
    }

    /// Tear the target down: close its stdin, give it a grace window to exit
    /// voluntarily, then kill.
    ///
    /// Never fails. Teardown problems are logged so they cannot mask the
    /// outcome of the exchange that preceded them.
    pub async fn shutdown(&mut self, grace: Duration) {
        // Closing stdin is the stop signal for a stdio server
        drop(self.stdin.take());

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(command = %self.command, %status, "target exited");
            }
            _ => {
                // Force kill if the target ignored the stdin close
                if let Err(e) = self.child.kill().await {
                    tracing::warn!(command = %self.command, error = %e, "failed to kill target");
                } else {
                    tracing::debug!(command = %self.command, "target killed after grace period");
                }
            }
        }
    }

    /// Read any available stderr output from the target.
    ///
    /// Meant to be called after shutdown, when the pipe has reached EOF and
    /// the full buffer is available. Uses a short timeout in case the target
    /// somehow kept the pipe open, and truncates to keep reports readable.
    pub async fn stderr_tail(&mut self) -> String {
        use tokio::io::AsyncReadExt;

        let Some(mut stderr) = self.stderr.take() else {
            return String::new();
        };

        let mut buf = String::new();
        match tokio::time::timeout(STDERR_DRAIN_TIMEOUT, stderr.read_to_string(&mut buf)).await {
            Ok(Ok(_)) => {
                if buf.len() > STDERR_TAIL_LIMIT {
                    let mut end = STDERR_TAIL_LIMIT;
                    while !buf.is_char_boundary(end) {
                        end -= 1;
                    }
                    buf.truncate(end);
                    buf.push_str("...(truncated)");
                }
                buf
            }
            _ => String::new(),
        }
    }
}
