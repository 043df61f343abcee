//! Error types for window resolution and capture
//!
//! Every failure of a screenshot request ends up as exactly one
//! [`ScreenshotError`]. The variants form a fixed taxonomy exposed to clients
//! through [`ErrorKind`]; none of them are retried internally.

use serde::{Deserialize, Serialize};

/// Result type alias for screenshot operations
pub type ScreenshotResult<T> = Result<T, ScreenshotError>;

/// Stable, client-visible error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationError,
    ProcessNotFound,
    NoWindow,
    AccessibilityPermissionDenied,
    #[serde(rename = "JXAExecutionFailed")]
    JxaExecutionFailed,
    OutputParseError,
    CaptureFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::ProcessNotFound => "ProcessNotFound",
            ErrorKind::NoWindow => "NoWindow",
            ErrorKind::AccessibilityPermissionDenied => "AccessibilityPermissionDenied",
            ErrorKind::JxaExecutionFailed => "JXAExecutionFailed",
            ErrorKind::OutputParseError => "OutputParseError",
            ErrorKind::CaptureFailed => "CaptureFailed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for a screenshot request
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScreenshotError {
    /// The tool arguments were missing, mistyped or out of range
    #[error("{}", issues.join("\n"))]
    Validation {
        /// One message per offending field
        issues: Vec<String>,
    },

    /// No running process matches the activated application
    #[error("No running process found for '{app_name}'")]
    ProcessNotFound { app_name: String },

    /// The application never showed a window within the time budget
    #[error("'{app_name}' has no open window")]
    NoWindow { app_name: String },

    /// osascript is not allowed to drive System Events
    #[error("Accessibility permission is required to inspect windows of '{app_name}'")]
    AccessibilityPermissionDenied { app_name: String },

    /// The automation subprocess failed for any other reason
    #[error("JXA execution failed for '{app_name}': {message}")]
    JxaExecutionFailed {
        app_name: String,
        /// Raw diagnostic text from the interpreter or the script
        message:  String,
    },

    /// The automation subprocess printed something that is not the expected JSON
    #[error("Failed to parse JXA output: {reason}")]
    OutputParseError {
        reason: String,
        /// The offending output line, for logs
        output: String,
    },

    /// `screencapture` failed or timed out
    #[error("screencapture failed for '{app_name}': {reason}")]
    CaptureFailed { app_name: String, reason: String },
}

impl ScreenshotError {
    /// Builds a validation error from a single message
    pub fn validation(message: impl Into<String>) -> Self {
        ScreenshotError::Validation {
            issues: vec![message.into()],
        }
    }

    /// Returns the taxonomy entry for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScreenshotError::Validation { .. } => ErrorKind::ValidationError,
            ScreenshotError::ProcessNotFound { .. } => ErrorKind::ProcessNotFound,
            ScreenshotError::NoWindow { .. } => ErrorKind::NoWindow,
            ScreenshotError::AccessibilityPermissionDenied { .. } => {
                ErrorKind::AccessibilityPermissionDenied
            }
            ScreenshotError::JxaExecutionFailed { .. } => ErrorKind::JxaExecutionFailed,
            ScreenshotError::OutputParseError { .. } => ErrorKind::OutputParseError,
            ScreenshotError::CaptureFailed { .. } => ErrorKind::CaptureFailed,
        }
    }

    /// Application name context, where the failing stage knew it
    pub fn app_name(&self) -> Option<&str> {
        match self {
            ScreenshotError::ProcessNotFound { app_name }
            | ScreenshotError::NoWindow { app_name }
            | ScreenshotError::AccessibilityPermissionDenied { app_name }
            | ScreenshotError::JxaExecutionFailed { app_name, .. }
            | ScreenshotError::CaptureFailed { app_name, .. } => Some(app_name),
            ScreenshotError::Validation { .. } | ScreenshotError::OutputParseError { .. } => None,
        }
    }

    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use screenshot_mac_mcp::error::ScreenshotError;
    ///
    /// let error = ScreenshotError::AccessibilityPermissionDenied {
    ///     app_name: "Safari".to_string(),
    /// };
    ///
    /// assert!(error.remediation_hint().contains("Accessibility"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            ScreenshotError::Validation { .. } => {
                "Provide bundleId or appName. windowIndex must be >= 0, timeoutMs >= 1000 and \
                 format one of png/jpg."
            }
            ScreenshotError::ProcessNotFound { .. } => {
                "Check that the application is installed and that bundleId/appName is spelled \
                 exactly as macOS reports it."
            }
            ScreenshotError::NoWindow { .. } => {
                "Open a window in the application, or raise timeoutMs if it is slow to launch."
            }
            ScreenshotError::AccessibilityPermissionDenied { .. } => {
                "Grant access in System Settings > Privacy & Security > Accessibility (and \
                 Automation > System Events) for the app running this server, then retry."
            }
            ScreenshotError::JxaExecutionFailed { .. } => {
                "osascript failed. Run the request again with RUST_LOG=screenshot_mac_mcp=debug \
                 to see the interpreter output."
            }
            ScreenshotError::OutputParseError { .. } => {
                "The window resolver returned unexpected output. This is a bug; please report it \
                 with the debug log."
            }
            ScreenshotError::CaptureFailed { .. } => {
                "screencapture failed. Grant Screen Recording permission in System Settings > \
                 Privacy & Security and make sure the window is on screen."
            }
        }
    }

    /// Text shown to clients in the error response
    ///
    /// Formatted as `<Kind>: <message>`; permission errors carry the
    /// remediation hint on a second line.
    pub fn client_message(&self) -> String {
        match self {
            ScreenshotError::AccessibilityPermissionDenied { .. } => {
                format!("{}: {}\n{}", self.kind(), self, self.remediation_hint())
            }
            _ => format!("{}: {}", self.kind(), self),
        }
    }
}
