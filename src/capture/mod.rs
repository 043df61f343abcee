//! Window resolution and capture
//!
//! The orchestrator talks to two traits:
//!
//! - [`WindowResolver`]: finds the target window and its device-pixel
//!   rectangle
//! - [`ScreenCapture`]: writes a screenshot of that window to disk
//!
//! The macOS implementations ([`JxaWindowResolver`], [`ScreencaptureCapturer`])
//! drive `osascript` and `screencapture` through the [`CommandRunner`] seam, so
//! every subprocess protocol can be exercised with
//! [`MockCommandRunner`](mock::MockCommandRunner) on any host.

use async_trait::async_trait;

use crate::{
    error::ScreenshotResult,
    model::{CaptureResult, ScreenshotRequest, WindowInfo},
};

pub mod jxa;
pub mod mock;
pub mod process;
pub mod screencapture;
pub mod window_id;

pub use jxa::{JxaWindowResolver, ScriptCache};
pub use mock::{MockCommandRunner, MockResponse};
pub use process::{CommandOutput, CommandRunner, CommandSpec, RunError, SystemCommandRunner};
pub use screencapture::ScreencaptureCapturer;

/// Locates the window a request targets
///
/// Implementations may activate (and thereby launch) the application and may
/// suspend for up to the request's `timeout_ms`.
///
/// # Errors
///
/// - [`ProcessNotFound`](crate::error::ScreenshotError::ProcessNotFound)
/// - [`NoWindow`](crate::error::ScreenshotError::NoWindow)
/// - [`AccessibilityPermissionDenied`](crate::error::ScreenshotError::AccessibilityPermissionDenied)
/// - [`JxaExecutionFailed`](crate::error::ScreenshotError::JxaExecutionFailed)
/// - [`OutputParseError`](crate::error::ScreenshotError::OutputParseError)
#[async_trait]
pub trait WindowResolver: Send + Sync {
    async fn resolve(&self, request: &ScreenshotRequest) -> ScreenshotResult<WindowInfo>;
}

/// Captures a resolved window into a file
///
/// The returned [`CaptureResult`] copies `rect`, `scale` and `app_name` from
/// `window`. The file lives in a fresh per-request directory whose parent is
/// what cleanup is scheduled on.
///
/// # Errors
///
/// Only [`CaptureFailed`](crate::error::ScreenshotError::CaptureFailed).
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    async fn capture(
        &self,
        request: &ScreenshotRequest,
        window: &WindowInfo,
    ) -> ScreenshotResult<CaptureResult>;
}
