//! Scripted command runner for testing
//!
//! [`MockCommandRunner`] stands in for [`SystemCommandRunner`](super::SystemCommandRunner)
//! so the `osascript`, `screencapture` and `GetWindowID` protocols can be
//! exercised without macOS.
//!
//! # Features
//!
//! - **Per-program queues:** responses are queued per program name and
//!   consumed in order; an empty queue answers with a successful, silent exit
//! - **Call recording:** every [`CommandSpec`] is kept for assertions
//! - **Capture simulation:** a successful `screencapture` call writes a
//!   placeholder file to its destination argument
//! - **Failure injection:** non-zero exits, timeouts and spawn failures
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use screenshot_mac_mcp::{
//!     capture::{CommandRunner, CommandSpec, MockCommandRunner, MockResponse},
//!     model::Rect,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = MockCommandRunner::new()
//!         .with_response("osascript", MockResponse::window("Example", Rect::new(0, 0, 10, 10), 1.0));
//!
//!     let spec = CommandSpec::new("osascript", Duration::from_secs(1));
//!     let output = runner.run(&spec).await.unwrap();
//!     assert!(output.stdout.contains("Example"));
//!     assert_eq!(runner.calls().len(), 1);
//! }
//! ```

use std::{
    collections::{HashMap, VecDeque},
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;

use super::{
    process::{CommandOutput, CommandRunner, CommandSpec, RunError},
    screencapture::SCREENCAPTURE,
};
use crate::model::Rect;

/// Bytes written by simulated captures (PNG signature)
pub const PLACEHOLDER_IMAGE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// One scripted answer
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// The process ran and exited with this output
    Output(CommandOutput),
    /// The process outlived its timeout
    TimedOut,
    /// The program could not be started
    SpawnError(String),
}

impl MockResponse {
    /// Successful exit printing `stdout`
    pub fn stdout(stdout: impl Into<String>) -> Self {
        MockResponse::Output(CommandOutput::ok(stdout))
    }

    /// Non-zero exit with `stderr`
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        MockResponse::Output(CommandOutput::failed(code, stderr))
    }

    /// Automation script output describing a resolved window
    pub fn window(app_name: &str, rect: Rect, scale: f64) -> Self {
        let line = serde_json::json!({ "appName": app_name, "rect": rect, "scale": scale });
        Self::stdout(format!("{line}\n"))
    }

    /// Automation script output reporting an error such as `"NoWindow"`
    pub fn script_error(error: &str, app_name: &str) -> Self {
        let line = serde_json::json!({ "error": error, "appName": app_name });
        Self::stdout(format!("{line}\n"))
    }
}

/// [`CommandRunner`] answering from per-program queues
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    responses: Mutex<HashMap<String, VecDeque<MockResponse>>>,
    calls:     Mutex<Vec<CommandSpec>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` for the next unanswered call to `program`
    pub fn with_response(self, program: &str, response: MockResponse) -> Self {
        self.push_response(program, response);
        self
    }

    /// Queues a response through a shared reference
    pub fn push_response(&self, program: &str, response: MockResponse) {
        lock(&self.responses)
            .entry(program.to_string())
            .or_default()
            .push_back(response);
    }

    /// Every call seen so far, in order
    pub fn calls(&self) -> Vec<CommandSpec> {
        lock(&self.calls).clone()
    }

    /// Calls made to `program`, in order
    pub fn calls_to(&self, program: &str) -> Vec<CommandSpec> {
        lock(&self.calls)
            .iter()
            .filter(|spec| spec.program == program)
            .cloned()
            .collect()
    }

    fn next_response(&self, program: &str) -> MockResponse {
        lock(&self.responses)
            .get_mut(program)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| MockResponse::stdout(""))
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RunError> {
        lock(&self.calls).push(spec.clone());

        match self.next_response(&spec.program) {
            MockResponse::Output(output) => {
                if output.success && spec.program == SCREENCAPTURE {
                    if let Some(destination) = spec.args.last() {
                        let _ = std::fs::write(Path::new(destination), PLACEHOLDER_IMAGE);
                    }
                }
                Ok(output)
            }
            MockResponse::TimedOut => Err(RunError::TimedOut {
                program:    spec.program.clone(),
                timeout_ms: spec.timeout_ms(),
            }),
            MockResponse::SpawnError(message) => Err(RunError::Spawn {
                program: spec.program.clone(),
                source:  std::io::Error::new(std::io::ErrorKind::NotFound, message),
            }),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
