//! screenshot-mac-mcp: macOS app-window screenshot MCP server
//!
//! Captures a single application window with the system `screencapture`
//! utility and returns the file path and `file://` URI to the MCP client.
//! Window geometry comes from a JXA script run through `osascript`; captured
//! files live in per-request temp directories deleted after a TTL.

pub mod capture;
pub mod config;
pub mod error;
pub mod handler;
pub mod mcp;
pub mod model;
pub mod request;
pub mod util;
