//! Data models and type definitions for screenshot-mac-mcp
//!
//! This module defines the core types that flow through a screenshot request:
//! - The tool argument shape advertised over MCP ([`ScreenshotArgs`])
//! - The validated request ([`ScreenshotRequest`])
//! - Window geometry produced by the resolver ([`WindowInfo`], [`Rect`])
//! - The capture output and the structured response payload

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output image format for `screencapture`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG (lossless) - default
    #[default]
    Png,
    /// JPEG
    Jpg,
}

impl ImageFormat {
    /// Returns the format name as passed to `screencapture -t`
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
        }
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// MIME type advertised on the resource link
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpg => "image/jpeg",
        }
    }

    /// Parses a format name, accepting only the advertised values
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "png" => Some(ImageFormat::Png),
            "jpg" => Some(ImageFormat::Jpg),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Window rectangle in device pixels (already multiplied by the display scale)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }
}

/// Identifies the target application
///
/// At least one of the bundle identifier or display name is always present;
/// when both are given the bundle identifier drives activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSelector {
    bundle_id: Option<String>,
    app_name:  Option<String>,
}

impl AppSelector {
    /// Builds a selector, returning `None` when both fields are absent
    pub fn new(bundle_id: Option<String>, app_name: Option<String>) -> Option<Self> {
        if bundle_id.is_none() && app_name.is_none() {
            return None;
        }
        Some(Self {
            bundle_id,
            app_name,
        })
    }

    pub fn by_bundle_id(bundle_id: impl Into<String>) -> Self {
        Self {
            bundle_id: Some(bundle_id.into()),
            app_name:  None,
        }
    }

    pub fn by_app_name(app_name: impl Into<String>) -> Self {
        Self {
            bundle_id: None,
            app_name:  Some(app_name.into()),
        }
    }

    pub fn bundle_id(&self) -> Option<&str> {
        self.bundle_id.as_deref()
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    /// Human-readable label used for error context before the real
    /// application name is known
    pub fn label(&self) -> &str {
        self.app_name
            .as_deref()
            .or(self.bundle_id.as_deref())
            .unwrap_or_default()
    }
}

/// A validated, defaulted screenshot request
///
/// Produced by [`crate::request::validate`]; immutable for the lifetime of one
/// tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotRequest {
    pub selector:         AppSelector,
    pub window_index:     u32,
    pub format:           ImageFormat,
    pub include_shadow:   bool,
    pub timeout_ms:       u64,
    pub prefer_window_id: bool,
}

impl ScreenshotRequest {
    /// Creates a request for `selector` with every option at its default
    pub fn new(selector: AppSelector) -> Self {
        Self {
            selector,
            window_index: 0,
            format: ImageFormat::Png,
            include_shadow: false,
            timeout_ms: crate::config::DEFAULT_REQUEST_TIMEOUT_MS,
            prefer_window_id: false,
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

/// Raw tool arguments as received over MCP
///
/// Every field is kept loosely typed so that type and range problems are
/// reported by the validator as tool errors instead of protocol errors. The
/// `schemars(with)` attributes advertise the intended types to clients.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(extend("anyOf" = [{ "required": ["bundleId"] }, { "required": ["appName"] }]))]
pub struct ScreenshotArgs {
    /// Bundle identifier of the target app, e.g. com.apple.Safari
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub bundle_id: Option<Value>,

    /// Display name of the target app, e.g. Safari (when the bundle id is unknown)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub app_name: Option<Value>,

    /// Zero-based window index; clamped to the last window (default: 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<u32>", extend("default" = 0))]
    pub window_index: Option<Value>,

    /// Output format: "png" or "jpg" (default: png)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<ImageFormat>", extend("default" = "png"))]
    pub format: Option<Value>,

    /// Keep the window drop shadow (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<bool>", extend("default" = false))]
    pub include_shadow: Option<Value>,

    /// Per-step subprocess timeout in milliseconds, minimum 1000 (default: 30000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<u64>", range(min = 1000), extend("default" = 30000))]
    pub timeout_ms: Option<Value>,

    /// Capture by native window id when GetWindowID is installed (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<bool>", extend("default" = false))]
    pub prefer_window_id: Option<Value>,
}

impl ScreenshotArgs {
    /// Arguments selecting the app by bundle identifier only
    pub fn for_bundle_id(bundle_id: &str) -> Self {
        Self {
            bundle_id: Some(Value::String(bundle_id.to_string())),
            ..Default::default()
        }
    }

    pub fn for_app_name(app_name: &str) -> Self {
        Self {
            app_name: Some(Value::String(app_name.to_string())),
            ..Default::default()
        }
    }
}

/// Resolved target window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub app_name: String,
    pub rect:     Rect,
    pub scale:    f64,
}

/// A screenshot written to disk by the capturer
///
/// The file is owned by the temp artifact manager, which is the only
/// component that deletes it.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureResult {
    pub path:     PathBuf,
    pub format:   ImageFormat,
    pub rect:     Rect,
    pub scale:    f64,
    pub app_name: String,
}

/// Structured payload returned to MCP clients on success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotPayload {
    /// Absolute path of the captured file
    pub path:     String,
    /// `file://` URI of the captured file
    pub uri:      String,
    pub app_name: String,
    pub rect:     Rect,
    pub scale:    f64,
    pub format:   ImageFormat,
}
