//! MCP service implementation with tool routing
//!
//! Exposes one tool, `screenshot_app_window`, under its canonical name and two
//! aliases some clients use for namespaced tools. All three route to the same
//! [`ScreenshotHandler`].

use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ErrorData as McpError, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::{handler::ScreenshotHandler, model::ScreenshotArgs};

/// Canonical tool name
pub const TOOL_NAME: &str = "screenshot_app_window";

/// Alternative names accepted for the same tool
pub const TOOL_ALIASES: [&str; 2] = [
    "mcp__screenshot__screenshot_app_window",
    "screenshot__screenshot_app_window",
];

/// Must match the `description` of the canonical `#[tool]` attribute
const TOOL_DESCRIPTION: &str = "Screenshot a macOS application window and return the file path and file:// URI. \
     Select the app with bundleId (preferred) or appName.";

/// Screenshot MCP server
///
/// Cheap to clone; clones share the underlying handler.
#[derive(Clone)]
pub struct ScreenshotMcpServer {
    handler:     ScreenshotHandler,
    tool_router: ToolRouter<Self>,
}

#[tool_router(router = tool_router)]
impl ScreenshotMcpServer {
    /// Creates a server around `handler`
    ///
    /// # Examples
    ///
    /// ```
    /// use screenshot_mac_mcp::{handler::ScreenshotHandler, mcp::ScreenshotMcpServer};
    ///
    /// let server = ScreenshotMcpServer::new(ScreenshotHandler::system());
    /// ```
    pub fn new(handler: ScreenshotHandler) -> Self {
        Self {
            handler,
            tool_router: Self::tool_router(),
        }
    }

    /// Screenshot tool
    ///
    /// Argument problems, missing permissions and capture failures are all
    /// reported as results with `isError: true`, never as protocol errors.
    ///
    /// # Examples
    ///
    /// Request:
    /// ```json
    /// {
    ///   "method": "tools/call",
    ///   "params": {
    ///     "name": "screenshot_app_window",
    ///     "arguments": { "bundleId": "com.apple.Safari", "format": "png" }
    ///   }
    /// }
    /// ```
    ///
    /// Structured result:
    /// ```json
    /// {
    ///   "path": "/var/folders/.../mcp-screenshot-Ab12/shot-<uuid>.png",
    ///   "uri": "file:///var/folders/.../mcp-screenshot-Ab12/shot-<uuid>.png",
    ///   "appName": "Safari",
    ///   "rect": { "x": 0, "y": 50, "w": 2880, "h": 1800 },
    ///   "scale": 2,
    ///   "format": "png"
    /// }
    /// ```
    #[tool(name = "screenshot_app_window", description = "Screenshot a macOS application window and return the file path and file:// URI. Select the app with bundleId (preferred) or appName.")]
    pub async fn screenshot_app_window(
        &self,
        Parameters(args): Parameters<ScreenshotArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.handler.handle_args(args).await)
    }

    #[tool(name = "mcp__screenshot__screenshot_app_window", description = "Alias of screenshot_app_window.")]
    pub async fn namespaced_screenshot_app_window(
        &self,
        Parameters(args): Parameters<ScreenshotArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.handler.handle_args(args).await)
    }

    #[tool(name = "screenshot__screenshot_app_window", description = "Alias of screenshot_app_window.")]
    pub async fn short_screenshot_app_window(
        &self,
        Parameters(args): Parameters<ScreenshotArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.handler.handle_args(args).await)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for ScreenshotMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "{TOOL_DESCRIPTION} Requires Accessibility permission for the process running \
                 this server and Screen Recording permission for screencapture."
            )),
            ..Default::default()
        }
    }
}
