//! Shared test utilities for integration tests
//!
//! [`McpTestContext`] wires a [`ScreenshotMcpServer`] to a scripted
//! [`MockCommandRunner`] and a private temp root, so the full tool path
//! (validation, osascript protocol, screencapture arguments, response
//! assembly) runs on any host.

#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, RawContent, RawResource},
};
use screenshot_mac_mcp::{
    capture::{MockCommandRunner, MockResponse, jxa::OSASCRIPT},
    handler::ScreenshotHandler,
    mcp::ScreenshotMcpServer,
    model::{Rect, ScreenshotArgs, ScreenshotPayload},
    util::temp_files::{TempArtifacts, TtlCleanup},
};
use tempfile::TempDir;

/// Test fixture for MCP server integration tests
pub struct McpTestContext {
    pub server: ScreenshotMcpServer,
    pub runner: Arc<MockCommandRunner>,
    /// Root for script and capture directories; removed on drop
    pub root:   TempDir,
}

impl McpTestContext {
    /// Context with cleanup disabled
    pub fn new() -> Self {
        Self::with_ttl_ms(0)
    }

    pub fn with_ttl_ms(ttl_ms: u64) -> Self {
        let runner = Arc::new(MockCommandRunner::new());
        let root = tempfile::tempdir().expect("temp root");
        let handler = ScreenshotHandler::with_runner(
            runner.clone(),
            TempArtifacts::with_root(root.path()),
            TtlCleanup::with_ttl_ms(ttl_ms),
        );
        Self {
            server: ScreenshotMcpServer::new(handler),
            runner,
            root,
        }
    }

    /// Queues a successful window resolution
    pub fn with_window(self, app_name: &str, rect: Rect, scale: f64) -> Self {
        self.runner
            .push_response(OSASCRIPT, MockResponse::window(app_name, rect, scale));
        self
    }

    /// Queues a response for any program
    pub fn with_response(self, program: &str, response: MockResponse) -> Self {
        self.runner.push_response(program, response);
        self
    }

    pub async fn screenshot(&self, args: ScreenshotArgs) -> CallToolResult {
        self.server
            .screenshot_app_window(Parameters(args))
            .await
            .expect("tool never fails at the protocol level")
    }

    /// Calls the tool with raw JSON arguments, as a client would send them
    pub async fn screenshot_json(&self, args: serde_json::Value) -> CallToolResult {
        let args: ScreenshotArgs = serde_json::from_value(args).expect("arguments deserialize");
        self.screenshot(args).await
    }

    /// Capture directories currently under the root
    pub fn capture_dirs(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.root.path())
            .expect("read temp root")
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                name.starts_with("mcp-screenshot-") && !name.starts_with("mcp-screenshot-script-")
            })
            .collect()
    }
}

/// Parts of a successful screenshot result
pub struct SuccessParts {
    pub payload: ScreenshotPayload,
    pub text:    String,
    pub link:    RawResource,
}

/// Structural checks for tool results
pub struct ContentValidator;

impl ContentValidator {
    /// Checks the success layout: structured payload, JSON text, resource link
    pub fn validate_success(result: &CallToolResult) -> Result<SuccessParts, String> {
        if result.is_error != Some(false) {
            return Err(format!("expected success, got {:?}", result));
        }
        let structured = result
            .structured_content
            .clone()
            .ok_or("missing structured content")?;
        let payload: ScreenshotPayload =
            serde_json::from_value(structured).map_err(|e| format!("bad payload: {e}"))?;

        if result.content.len() != 2 {
            return Err(format!("expected 2 content items, got {}", result.content.len()));
        }
        let text = result.content[0]
            .as_text()
            .ok_or("first item is not text")?
            .text
            .clone();
        let link = match &result.content[1].raw {
            RawContent::ResourceLink(link) => link.clone(),
            other => return Err(format!("second item is not a resource link: {other:?}")),
        };

        Ok(SuccessParts { payload, text, link })
    }

    /// Returns the error text of a failed result
    pub fn validate_error(result: &CallToolResult) -> Result<String, String> {
        if result.is_error != Some(true) {
            return Err(format!("expected error, got {:?}", result));
        }
        if result.structured_content.is_some() {
            return Err("error results carry no structured content".to_string());
        }
        result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .ok_or_else(|| "missing error text".to_string())
    }
}
