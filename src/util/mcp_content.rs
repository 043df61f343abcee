//! MCP content builders for screenshot results
//!
//! A successful capture is returned three ways at once:
//! - `structured_content`: the [`ScreenshotPayload`] object
//! - a text item with the same payload as pretty JSON, for clients that
//!   ignore structured content
//! - a `resource_link` to the file with its MIME type
//!
//! Failures carry a single text item and no structured content.
//!
//! # Examples
//!
//! ```
//! use std::path::PathBuf;
//!
//! use screenshot_mac_mcp::{
//!     model::{CaptureResult, ImageFormat, Rect},
//!     util::mcp_content::build_success_result,
//! };
//!
//! let capture = CaptureResult {
//!     path:     PathBuf::from("/tmp/x/shot.png"),
//!     format:   ImageFormat::Png,
//!     rect:     Rect::new(0, 0, 800, 600),
//!     scale:    2.0,
//!     app_name: "Safari".to_string(),
//! };
//!
//! let result = build_success_result(&capture);
//! assert_eq!(result.is_error, Some(false));
//! assert_eq!(result.content.len(), 2);
//! ```

use std::path::Path;

use rmcp::model::{Annotated, CallToolResult, Content, RawContent, RawResource};
use url::Url;

use crate::{
    error::ScreenshotError,
    model::{CaptureResult, ImageFormat, ScreenshotPayload},
};

/// Converts an absolute path into a `file://` URI
///
/// Characters that are legal in a URL path (`+`, `@`, `:` and friends) are
/// kept; everything else is percent-encoded byte by byte. A path `url` rejects
/// (not absolute) is joined verbatim.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use screenshot_mac_mcp::util::mcp_content::file_uri;
///
/// assert_eq!(file_uri(Path::new("/tmp/x/shot.png")), "file:///tmp/x/shot.png");
/// assert_eq!(file_uri(Path::new("/tmp/my shot.png")), "file:///tmp/my%20shot.png");
/// ```
pub fn file_uri(path: &Path) -> String {
    match Url::from_file_path(path) {
        Ok(url) => url.into(),
        Err(()) => {
            tracing::warn!(path = %path.display(), "not an absolute path; building file URI verbatim");
            format!("file://{}", path.display())
        }
    }
}

/// Structured payload for a capture
pub fn build_payload(capture: &CaptureResult) -> ScreenshotPayload {
    ScreenshotPayload {
        path:     capture.path.to_string_lossy().into_owned(),
        uri:      file_uri(&capture.path),
        app_name: capture.app_name.clone(),
        rect:     capture.rect,
        scale:    capture.scale,
        format:   capture.format,
    }
}

/// `resource_link` content pointing at the captured file
pub fn build_resource_link(path: &Path, app_name: &str, format: ImageFormat) -> Content {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("screenshot.{}", format.extension()));

    let mut resource = RawResource::new(file_uri(path), name);
    resource.title = Some(app_name.to_string());
    resource.description = Some(format!("Screenshot of {app_name}"));
    resource.mime_type = Some(format.mime_type().to_string());

    Annotated::new(RawContent::ResourceLink(resource), None)
}

/// Success result for a finished capture
pub fn build_success_result(capture: &CaptureResult) -> CallToolResult {
    let payload = build_payload(capture);

    let text = serde_json::to_string_pretty(&payload)
        .unwrap_or_else(|_| format!("{{\"path\": {:?}}}", payload.path));
    let link = build_resource_link(&capture.path, &capture.app_name, capture.format);

    let mut result = CallToolResult::success(vec![Content::text(text), link]);
    result.structured_content = serde_json::to_value(&payload).ok();
    result
}

/// Error result for a failed request
pub fn build_error_result(error: &ScreenshotError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(error.client_message())])
}
