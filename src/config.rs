//! Probe configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

// ─── Defaults ────────────────────────────────────────────────────────────────

/// Default bounded wait for the single response line.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default window for a voluntary target exit before force-killing.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

// ─── Configuration ───────────────────────────────────────────────────────────

/// Launch recipe for the service under test.
///
/// Fixed for the whole run; every step spawns a fresh instance from the same
/// recipe.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub cwd: Option<PathBuf>,
}

impl TargetConfig {
    /// Recipe for `command` with no arguments, no environment overlay, and
    /// the inherited working directory.
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
        }
    }

    /// Display form of the command for logs and error messages.
    pub fn command_display(&self) -> String {
        self.command.display().to_string()
    }
}

/// Full probe configuration: the target recipe plus timing policy.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub target: TargetConfig,
    /// Bounded wait for the one response line; expiry is reported as an
    /// absent response, same as a closed stream.
    pub response_timeout: Duration,
    /// Voluntary-exit window before the target is killed during teardown.
    pub shutdown_grace: Duration,
}

impl ProbeConfig {
    /// Configuration with the default timing policy.
    pub fn new(target: TargetConfig) -> Self {
        Self {
            target,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
