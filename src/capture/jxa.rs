//! JXA (JavaScript for Automation) window resolver
//!
//! Runs the embedded `window_rect.jxa.js` through
//! `osascript -l JavaScript <script> <json>` and turns its single line of JSON
//! output into a [`WindowInfo`] or a typed [`ScreenshotError`].

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use super::{
    WindowResolver,
    process::{CommandOutput, CommandRunner, CommandSpec},
};
use crate::{
    config::{ACTIVATE_SETTLE_MS, WINDOW_POLL_INTERVAL_MS, window_wait_budget_ms},
    error::{ScreenshotError, ScreenshotResult},
    model::{Rect, ScreenshotRequest, WindowInfo},
};

/// Interpreter binary
pub const OSASCRIPT: &str = "osascript";

/// Automation script source
pub const SCRIPT: &str = include_str!("window_rect.jxa.js");

const SCRIPT_DIR_PREFIX: &str = "mcp-screenshot-script-";
const SCRIPT_FILE_NAME: &str = "window-rect.jxa.js";

/// Diagnostics emitted when the automation permission is missing
///
/// - `-1719`: assistive access is not enabled
/// - `-25211`: accessibility API disabled
/// - `-1743`: not authorized to send Apple events
static PERMISSION_DENIED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)-1719\b|-25211\b|-1743\b|assistive access|not authori[sz]ed to send apple events|not allowed to send keystrokes",
    )
    .expect("permission pattern is a valid regex")
});

/// Returns true when `diagnostics` indicate missing Accessibility or
/// Automation permission
pub fn is_permission_denied(diagnostics: &str) -> bool {
    PERMISSION_DENIED.is_match(diagnostics)
}

/// Write-once location of the automation script on disk
///
/// Clones share the same cell. The first caller writes the script; callers
/// racing with it wait for that write instead of producing a second file.
#[derive(Debug, Clone, Default)]
pub struct ScriptCache {
    root: Option<PathBuf>,
    path: Arc<OnceCell<PathBuf>>,
}

impl ScriptCache {
    /// Cache writing under the system temp directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache writing under `root` instead of the system temp directory
    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            path: Arc::default(),
        }
    }

    /// Path of the script, written on first use
    pub async fn path(&self) -> std::io::Result<PathBuf> {
        let path = self
            .path
            .get_or_try_init(|| async {
                let root = self.root.clone().unwrap_or_else(std::env::temp_dir);
                let dir = tempfile::Builder::new()
                    .prefix(SCRIPT_DIR_PREFIX)
                    .tempdir_in(root)?
                    .keep();
                let file = dir.join(SCRIPT_FILE_NAME);
                tokio::fs::write(&file, SCRIPT).await?;
                tracing::debug!(path = %file.display(), "wrote automation script");
                Ok::<_, std::io::Error>(file)
            })
            .await?;
        Ok(path.clone())
    }
}

/// JSON argument passed as `argv[0]` to the script
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScriptArgs<'a> {
    bundle_id:    Option<&'a str>,
    app_name:     Option<&'a str>,
    window_index: u32,
    wait_ms:      u64,
    poll_ms:      u64,
    settle_ms:    u64,
}

impl<'a> ScriptArgs<'a> {
    fn from_request(request: &'a ScreenshotRequest) -> Self {
        Self {
            bundle_id:    request.selector.bundle_id(),
            app_name:     request.selector.app_name(),
            window_index: request.window_index,
            wait_ms:      window_wait_budget_ms(request.timeout_ms),
            poll_ms:      WINDOW_POLL_INTERVAL_MS,
            settle_ms:    ACTIVATE_SETTLE_MS,
        }
    }
}

/// Builds the `osascript` invocation for `request`
pub fn build_command(script: &Path, request: &ScreenshotRequest) -> ScreenshotResult<CommandSpec> {
    let json = serde_json::to_string(&ScriptArgs::from_request(request)).map_err(|e| {
        ScreenshotError::JxaExecutionFailed {
            app_name: request.selector.label().to_string(),
            message:  format!("failed to encode script arguments: {e}"),
        }
    })?;

    Ok(CommandSpec::new(OSASCRIPT, request.timeout())
        .args(["-l", "JavaScript"])
        .arg(script.to_string_lossy())
        .arg(json))
}

/// [`WindowResolver`] backed by `osascript`
pub struct JxaWindowResolver {
    runner:  Arc<dyn CommandRunner>,
    scripts: ScriptCache,
}

impl JxaWindowResolver {
    pub fn new(runner: Arc<dyn CommandRunner>, scripts: ScriptCache) -> Self {
        Self { runner, scripts }
    }
}

#[async_trait]
impl WindowResolver for JxaWindowResolver {
    async fn resolve(&self, request: &ScreenshotRequest) -> ScreenshotResult<WindowInfo> {
        let label = request.selector.label();

        let script = self
            .scripts
            .path()
            .await
            .map_err(|e| ScreenshotError::JxaExecutionFailed {
                app_name: label.to_string(),
                message:  format!("failed to write automation script: {e}"),
            })?;
        let spec = build_command(&script, request)?;

        let output =
            self.runner
                .run(&spec)
                .await
                .map_err(|e| ScreenshotError::JxaExecutionFailed {
                    app_name: label.to_string(),
                    message:  e.to_string(),
                })?;

        if !output.success {
            let error = classify_failure(&output, label);
            tracing::warn!(app = label, error = %error, "window resolution failed");
            return Err(error);
        }

        let info = parse_jxa_output(&output.stdout, label)?;
        tracing::debug!(
            app = %info.app_name,
            x = info.rect.x,
            y = info.rect.y,
            w = info.rect.w,
            h = info.rect.h,
            scale = info.scale,
            "resolved window"
        );
        Ok(info)
    }
}

/// Maps a non-zero `osascript` exit to an error
fn classify_failure(output: &CommandOutput, app_name: &str) -> ScreenshotError {
    let diagnostics = output.combined();
    if is_permission_denied(&diagnostics) {
        return ScreenshotError::AccessibilityPermissionDenied {
            app_name: app_name.to_string(),
        };
    }

    let message = if diagnostics.is_empty() {
        format!("osascript exited with {}", output.exit_description())
    } else {
        diagnostics
    };
    ScreenshotError::JxaExecutionFailed {
        app_name: app_name.to_string(),
        message,
    }
}

/// Parses the script output
///
/// Only the last non-empty line is considered. Numeric fields may arrive as
/// numbers or numeric strings; rectangle values are rounded to whole pixels.
/// `fallback_app` fills in the application name when the script omits it.
///
/// # Examples
///
/// ```
/// use screenshot_mac_mcp::capture::jxa::parse_jxa_output;
///
/// let info = parse_jxa_output(
///     r#"{"appName":"Example","rect":{"x":1,"y":2,"w":300,"h":200},"scale":2}"#,
///     "Example",
/// )
/// .unwrap();
/// assert_eq!(info.rect.w, 300);
/// ```
pub fn parse_jxa_output(stdout: &str, fallback_app: &str) -> ScreenshotResult<WindowInfo> {
    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .ok_or_else(|| parse_error("script produced no output", stdout))?;

    let value: Value = serde_json::from_str(line).map_err(|e| parse_error(e.to_string(), line))?;
    let object = value
        .as_object()
        .ok_or_else(|| parse_error("expected a JSON object", line))?;

    let app_name = object
        .get("appName")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback_app)
        .to_string();

    if let Some(error) = object.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(match message.as_str() {
            "ProcessNotFound" => ScreenshotError::ProcessNotFound { app_name },
            "NoWindow" => ScreenshotError::NoWindow { app_name },
            _ if is_permission_denied(&message) => {
                ScreenshotError::AccessibilityPermissionDenied { app_name }
            }
            _ => ScreenshotError::JxaExecutionFailed { app_name, message },
        });
    }

    let rect = object
        .get("rect")
        .and_then(Value::as_object)
        .ok_or_else(|| parse_error("missing rect", line))?;
    let rect = Rect::new(
        rect_component(rect, "x", line)?,
        rect_component(rect, "y", line)?,
        rect_component(rect, "w", line)?,
        rect_component(rect, "h", line)?,
    );

    let scale = object
        .get("scale")
        .and_then(coerce_number)
        .filter(|scale| *scale > 0.0)
        .ok_or_else(|| parse_error("scale must be a positive number", line))?;

    Ok(WindowInfo {
        app_name,
        rect,
        scale,
    })
}

fn rect_component(rect: &Map<String, Value>, key: &str, line: &str) -> ScreenshotResult<i64> {
    rect.get(key)
        .and_then(coerce_number)
        .map(|n| n.round() as i64)
        .ok_or_else(|| parse_error(format!("rect.{key} is not a number"), line))
}

fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn parse_error(reason: impl Into<String>, output: &str) -> ScreenshotError {
    ScreenshotError::OutputParseError {
        reason: reason.into(),
        output: output.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        capture::mock::{MockCommandRunner, MockResponse},
        error::ErrorKind,
        model::AppSelector,
    };

    fn request_for(selector: AppSelector) -> ScreenshotRequest {
        ScreenshotRequest::new(selector)
    }

    fn resolver(runner: Arc<MockCommandRunner>, root: &Path) -> JxaWindowResolver {
        JxaWindowResolver::new(runner, ScriptCache::in_dir(root))
    }

    #[test]
    fn test_parse_success_passes_values_through() {
        let stdout = r#"{"appName":"Example","rect":{"x":1,"y":2,"w":300,"h":200},"scale":2}"#;
        let info = parse_jxa_output(stdout, "fallback").unwrap();
        assert_eq!(
            info,
            WindowInfo {
                app_name: "Example".to_string(),
                rect:     Rect::new(1, 2, 300, 200),
                scale:    2.0,
            }
        );
    }

    #[test]
    fn test_parse_coerces_numeric_strings() {
        let stdout = r#"{"appName":"Example","rect":{"x":"1","y":2.4,"w":"299.6","h":200},"scale":"2"}"#;
        let info = parse_jxa_output(stdout, "fallback").unwrap();
        assert_eq!(info.rect, Rect::new(1, 2, 300, 200));
        assert_eq!(info.scale, 2.0);
    }

    #[test]
    fn test_parse_uses_last_non_empty_line() {
        let stdout = "warning: something\n{\"appName\":\"A\",\"rect\":{\"x\":0,\"y\":0,\"w\":1,\"h\":1},\"scale\":1}\n\n";
        assert_eq!(parse_jxa_output(stdout, "A").unwrap().rect, Rect::new(0, 0, 1, 1));
    }

    #[test]
    fn test_parse_no_window_error() {
        let error = parse_jxa_output(r#"{"error":"NoWindow","appName":"Example"}"#, "x").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NoWindow);
        assert_eq!(error.app_name(), Some("Example"));
    }

    #[test]
    fn test_parse_process_not_found_uses_fallback_app() {
        let error = parse_jxa_output(r#"{"error":"ProcessNotFound"}"#, "com.example.app").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ProcessNotFound);
        assert_eq!(error.app_name(), Some("com.example.app"));
    }

    #[test]
    fn test_parse_unknown_error_string() {
        let error = parse_jxa_output(r#"{"error":"Application can't be found.","appName":"Nope"}"#, "Nope")
            .unwrap_err();
        match error {
            ScreenshotError::JxaExecutionFailed { app_name, message } => {
                assert_eq!(app_name, "Nope");
                assert_eq!(message, "Application can't be found.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_permission_error_string() {
        let error = parse_jxa_output(
            r#"{"error":"Error: osascript is not allowed assistive access. (-1719)"}"#,
            "Safari",
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::AccessibilityPermissionDenied);
    }

    #[test]
    fn test_parse_malformed_output() {
        for stdout in ["", "not json", "[1,2]", r#"{"appName":"A"}"#, r#"{"rect":{"x":0,"y":0,"w":1,"h":1},"scale":0}"#] {
            let error = parse_jxa_output(stdout, "A").unwrap_err();
            assert_eq!(error.kind(), ErrorKind::OutputParseError, "stdout {stdout:?}");
        }
    }

    #[test]
    fn test_permission_markers() {
        assert!(is_permission_denied("execution error: Not authorized to send Apple events to System Events. (-1743)"));
        assert!(is_permission_denied("System Events got an error: osascript is not allowed assistive access."));
        assert!(is_permission_denied("error -25211"));
        assert!(!is_permission_denied("execution error: Error: Application can't be found. (-2700)"));
    }

    #[test]
    fn test_script_args_serialization() {
        let mut request = request_for(AppSelector::by_bundle_id("com.apple.Safari"));
        request.window_index = 1;
        request.timeout_ms = 4_000;
        let json = serde_json::to_value(ScriptArgs::from_request(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "bundleId": "com.apple.Safari",
                "appName": null,
                "windowIndex": 1,
                "waitMs": 2000,
                "pollMs": 100,
                "settleMs": 250
            })
        );
    }

    #[test]
    fn test_build_command_shape() {
        let request = request_for(AppSelector::by_app_name("Safari"));
        let spec = build_command(Path::new("/tmp/s/window-rect.jxa.js"), &request).unwrap();
        assert_eq!(spec.program, OSASCRIPT);
        assert_eq!(&spec.args[..3], ["-l", "JavaScript", "/tmp/s/window-rect.jxa.js"]);
        assert!(spec.args[3].contains(r#""appName":"Safari""#));
        assert_eq!(spec.timeout, Duration::from_millis(30_000));
    }

    #[tokio::test]
    async fn test_script_cache_writes_once() {
        let root = tempfile::tempdir().unwrap();
        let cache = ScriptCache::in_dir(root.path());
        let clone = cache.clone();

        let (first, second) = tokio::join!(cache.path(), clone.path());
        let first = first.unwrap();
        assert_eq!(first, second.unwrap());
        assert_eq!(std::fs::read_to_string(&first).unwrap(), SCRIPT);
        assert_eq!(first.file_name().unwrap(), SCRIPT_FILE_NAME);
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(
            MockCommandRunner::new()
                .with_response(OSASCRIPT, MockResponse::window("Example", Rect::new(1, 2, 300, 200), 2.0)),
        );
        let info = resolver(runner.clone(), root.path())
            .resolve(&request_for(AppSelector::by_app_name("Example")))
            .await
            .unwrap();
        assert_eq!(info.rect, Rect::new(1, 2, 300, 200));
        assert_eq!(runner.calls_to(OSASCRIPT).len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_permission_denied_from_stderr() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockCommandRunner::new().with_response(
            OSASCRIPT,
            MockResponse::Output(CommandOutput::failed(
                1,
                "execution error: System Events got an error: osascript is not allowed assistive access. (-1719)",
            )),
        ));
        let error = resolver(runner, root.path())
            .resolve(&request_for(AppSelector::by_app_name("Safari")))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::AccessibilityPermissionDenied);
        assert_eq!(error.app_name(), Some("Safari"));
        assert!(error.client_message().contains("Accessibility"));
    }

    #[tokio::test]
    async fn test_resolve_other_failure() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockCommandRunner::new().with_response(
            OSASCRIPT,
            MockResponse::Output(CommandOutput::failed(1, "execution error: Error: boom (-2700)")),
        ));
        let error = resolver(runner, root.path())
            .resolve(&request_for(AppSelector::by_bundle_id("com.example.app")))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::JxaExecutionFailed);
        assert_eq!(error.app_name(), Some("com.example.app"));
        assert!(error.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_resolve_timeout_and_spawn_failure() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(
            MockCommandRunner::new()
                .with_response(OSASCRIPT, MockResponse::TimedOut)
                .with_response(OSASCRIPT, MockResponse::SpawnError("No such file or directory".into())),
        );
        let resolver = resolver(runner, root.path());
        let request = request_for(AppSelector::by_app_name("Example"));

        let timed_out = resolver.resolve(&request).await.unwrap_err();
        assert_eq!(timed_out.kind(), ErrorKind::JxaExecutionFailed);
        assert!(timed_out.to_string().contains("timed out after 30000ms"));

        let spawn = resolver.resolve(&request).await.unwrap_err();
        assert_eq!(spawn.kind(), ErrorKind::JxaExecutionFailed);
    }

    #[tokio::test]
    async fn test_resolve_malformed_output() {
        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockCommandRunner::new().with_response(OSASCRIPT, MockResponse::stdout("oops")));
        let error = resolver(runner, root.path())
            .resolve(&request_for(AppSelector::by_app_name("Example")))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::OutputParseError);
    }
}
