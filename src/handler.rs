//! Request orchestration
//!
//! [`ScreenshotHandler`] runs validate → resolve → capture → schedule cleanup
//! and folds the outcome into a single `CallToolResult`. Stages run strictly
//! in sequence; the first failure short-circuits to an error result.

use std::{path::Path, sync::Arc, time::Instant};

use rmcp::model::CallToolResult;
use serde_json::Value;

use crate::{
    capture::{
        CommandRunner, JxaWindowResolver, ScreenCapture, ScreencaptureCapturer, ScriptCache,
        SystemCommandRunner, WindowResolver,
    },
    error::ScreenshotResult,
    model::{CaptureResult, ScreenshotArgs, ScreenshotRequest},
    request,
    util::{
        mcp_content::{build_error_result, build_success_result},
        temp_files::{CleanupScheduler, TempArtifacts, TtlCleanup},
    },
};

/// Runs screenshot requests end to end
#[derive(Clone)]
pub struct ScreenshotHandler {
    resolver: Arc<dyn WindowResolver>,
    capturer: Arc<dyn ScreenCapture>,
    cleanup:  Arc<dyn CleanupScheduler>,
}

impl ScreenshotHandler {
    pub fn new(
        resolver: Arc<dyn WindowResolver>,
        capturer: Arc<dyn ScreenCapture>,
        cleanup: Arc<dyn CleanupScheduler>,
    ) -> Self {
        Self {
            resolver,
            capturer,
            cleanup,
        }
    }

    /// Handler driving the real `osascript` and `screencapture` binaries
    pub fn system() -> Self {
        Self::with_runner(Arc::new(SystemCommandRunner::new()), TempArtifacts::new(), TtlCleanup::from_env())
    }

    /// Handler whose subprocesses all go through `runner`
    ///
    /// The automation script is written under the artifacts root.
    pub fn with_runner(
        runner: Arc<dyn CommandRunner>,
        artifacts: TempArtifacts,
        cleanup: TtlCleanup,
    ) -> Self {
        let scripts = ScriptCache::in_dir(artifacts.root());
        Self::new(
            Arc::new(JxaWindowResolver::new(runner.clone(), scripts)),
            Arc::new(ScreencaptureCapturer::new(runner, artifacts)),
            Arc::new(cleanup),
        )
    }

    /// Handles untyped tool arguments
    pub async fn handle(&self, raw: &Value) -> CallToolResult {
        self.finish(request::validate(raw)).await
    }

    /// Handles arguments already deserialized by the MCP layer
    pub async fn handle_args(&self, args: ScreenshotArgs) -> CallToolResult {
        self.finish(request::validate_args(args)).await
    }

    async fn finish(&self, request: ScreenshotResult<ScreenshotRequest>) -> CallToolResult {
        let outcome = match request {
            Ok(request) => self.run(&request).await,
            Err(error) => Err(error),
        };
        match outcome {
            Ok(capture) => build_success_result(&capture),
            Err(error) => {
                tracing::warn!(kind = %error.kind(), error = %error, "screenshot request failed");
                build_error_result(&error)
            }
        }
    }

    /// Resolves, captures and schedules cleanup for a validated request
    pub async fn run(&self, request: &ScreenshotRequest) -> ScreenshotResult<CaptureResult> {
        let start = Instant::now();
        let app = request.selector.label();
        tracing::info!(
            app,
            window_index = request.window_index,
            format = %request.format,
            prefer_window_id = request.prefer_window_id,
            "screenshot start"
        );

        let window = self.resolver.resolve(request).await?;
        let capture = self.capturer.capture(request, &window).await?;

        let ttl_ms = self.cleanup.ttl_ms();
        if ttl_ms > 0 {
            if let Some(dir) = capture.path.parent().filter(|dir| *dir != Path::new("")) {
                self.cleanup.schedule_cleanup(dir, ttl_ms);
            }
        }

        tracing::info!(
            app = %capture.app_name,
            path = %capture.path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "screenshot ok"
        );
        Ok(capture)
    }
}
