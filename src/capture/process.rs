//! Subprocess execution with a hard timeout
//!
//! All three external tools (`osascript`, `screencapture`, the optional
//! `GetWindowID` pipeline) are driven through [`CommandRunner`], which makes
//! every protocol testable with [`crate::capture::mock::MockCommandRunner`].

use std::{process::Stdio, time::Duration};

use async_trait::async_trait;
use tokio::process::Command;

/// A single subprocess invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args:    Vec<String>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Captured result of a finished subprocess
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal
    pub code:    Option<i32>,
    pub success: bool,
    pub stdout:  String,
    pub stderr:  String,
}

impl CommandOutput {
    /// Successful exit with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code:    Some(0),
            success: true,
            stdout:  stdout.into(),
            stderr:  String::new(),
        }
    }

    /// Failed exit with the given code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code:    Some(code),
            success: false,
            stdout:  String::new(),
            stderr:  stderr.into(),
        }
    }

    /// stderr followed by stdout, for diagnostics matching
    pub fn combined(&self) -> String {
        match (self.stderr.trim(), self.stdout.trim()) {
            ("", out) => out.to_string(),
            (err, "") => err.to_string(),
            (err, out) => format!("{err}\n{out}"),
        }
    }

    /// Short description of how the process ended
    pub fn exit_description(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Reasons a subprocess produced no output at all
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source:  std::io::Error,
    },

    #[error("{program} timed out after {timeout_ms}ms")]
    TimedOut { program: String, timeout_ms: u64 },
}

/// Runs external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `spec` to completion, killing it if it outlives `spec.timeout`
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RunError>;
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RunError> {
        tracing::debug!(program = %spec.program, args = ?spec.args, "spawning");

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own group, so a timeout also reaches grandchildren (`bash -lc` pipelines).
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|source| RunError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
        let pid = child.id();

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(|source| RunError::Spawn {
                program: spec.program.clone(),
                source,
            })?,
            Err(_) => {
                kill_process_group(pid);
                tracing::warn!(program = %spec.program, timeout_ms = spec.timeout_ms(), "timed out");
                return Err(RunError::TimedOut {
                    program:    spec.program.clone(),
                    timeout_ms: spec.timeout_ms(),
                });
            }
        };

        let result = CommandOutput {
            code:    output.status.code(),
            success: output.status.success(),
            stdout:  String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr:  String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(
            program = %spec.program,
            code = ?result.code,
            stderr = %result.stderr.trim(),
            "finished"
        );
        Ok(result)
    }
}

/// Sends SIGKILL to the process group led by `pid`
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::{
        sys::signal::{Signal, killpg},
        unistd::Pid,
    };

    let Some(pgid) = pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    if let Err(errno) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        tracing::debug!(pgid, %errno, "process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
