//! `screencapture` driver
//!
//! Captures either the resolved rectangle (`-R x,y,w,h`) or, when
//! `preferWindowId` is set and `GetWindowID` finds one, a native window
//! (`-l <id>`).

use std::{path::Path, sync::Arc};

use async_trait::async_trait;

use super::{
    ScreenCapture,
    process::{CommandRunner, CommandSpec},
    window_id::resolve_window_id,
};
use crate::{
    error::{ScreenshotError, ScreenshotResult},
    model::{CaptureResult, ImageFormat, Rect, ScreenshotRequest, WindowInfo},
    util::temp_files::{TempArtifacts, artifact_file_name},
};

/// Capture utility binary
pub const SCREENCAPTURE: &str = "screencapture";

/// What `screencapture` is pointed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    Rect(Rect),
    WindowId(String),
}

/// `x,y,w,h` as expected by `screencapture -R`
pub fn format_rect_arg(rect: &Rect) -> String {
    format!("{},{},{},{}", rect.x, rect.y, rect.w, rect.h)
}

/// Full argument list, destination last
pub fn build_capture_args(
    format: ImageFormat,
    include_shadow: bool,
    target: &CaptureTarget,
    destination: &Path,
) -> Vec<String> {
    // -x: no shutter sound
    let mut args = vec!["-x".to_string(), "-t".to_string(), format.as_str().to_string()];
    if !include_shadow {
        args.push("-o".to_string());
    }
    match target {
        CaptureTarget::Rect(rect) => {
            args.push("-R".to_string());
            args.push(format_rect_arg(rect));
        }
        CaptureTarget::WindowId(id) => {
            args.push("-l".to_string());
            args.push(id.clone());
        }
    }
    args.push(destination.to_string_lossy().into_owned());
    args
}

/// [`ScreenCapture`] backed by `screencapture`
pub struct ScreencaptureCapturer {
    runner:    Arc<dyn CommandRunner>,
    artifacts: TempArtifacts,
}

impl ScreencaptureCapturer {
    pub fn new(runner: Arc<dyn CommandRunner>, artifacts: TempArtifacts) -> Self {
        Self { runner, artifacts }
    }

    async fn choose_target(&self, request: &ScreenshotRequest, window: &WindowInfo) -> CaptureTarget {
        if request.prefer_window_id {
            if let Some(id) =
                resolve_window_id(self.runner.as_ref(), &window.app_name, request.timeout()).await
            {
                return CaptureTarget::WindowId(id);
            }
        }
        CaptureTarget::Rect(window.rect)
    }
}

#[async_trait]
impl ScreenCapture for ScreencaptureCapturer {
    async fn capture(
        &self,
        request: &ScreenshotRequest,
        window: &WindowInfo,
    ) -> ScreenshotResult<CaptureResult> {
        let failed = |reason: String| ScreenshotError::CaptureFailed {
            app_name: window.app_name.clone(),
            reason,
        };

        let dir = self
            .artifacts
            .create_artifact_dir()
            .map_err(|e| failed(format!("failed to create temp directory: {e}")))?;
        let path = dir.join(artifact_file_name(request.format));

        let target = self.choose_target(request, window).await;
        let args = build_capture_args(request.format, request.include_shadow, &target, &path);
        let spec = CommandSpec::new(SCREENCAPTURE, request.timeout()).args(args);

        let failure = match self.runner.run(&spec).await {
            Ok(output) if output.success => None,
            Ok(output) => {
                let stderr = output.stderr.trim();
                Some(if stderr.is_empty() {
                    output.exit_description()
                } else {
                    format!("{}: {stderr}", output.exit_description())
                })
            }
            Err(e) => Some(e.to_string()),
        };

        if let Some(reason) = failure {
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                tracing::debug!(dir = %dir.display(), error = %e, "failed to remove capture directory");
            }
            tracing::warn!(app = %window.app_name, reason = %reason, "screencapture failed");
            return Err(failed(reason));
        }

        tracing::debug!(path = %path.display(), target = ?target, "captured window");
        Ok(CaptureResult {
            path,
            format: request.format,
            rect: window.rect,
            scale: window.scale,
            app_name: window.app_name.clone(),
        })
    }
}
