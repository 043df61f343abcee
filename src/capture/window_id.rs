//! Best-effort native window id lookup via the `GetWindowID` helper
//!
//! The helper is optional. Missing tool, non-zero exit, timeout and empty or
//! non-numeric output all mean "no id" and callers fall back to rectangle
//! capture.

use std::time::Duration;

use super::process::{CommandRunner, CommandSpec};

/// Shell used to run the lookup pipeline
pub const SHELL: &str = "bash";

/// Quotes `value` for a POSIX shell
///
/// # Examples
///
/// ```
/// use screenshot_mac_mcp::capture::window_id::shell_quote;
///
/// assert_eq!(shell_quote("Safari"), "'Safari'");
/// assert_eq!(shell_quote("Bob's App"), r"'Bob'\''s App'");
/// ```
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Pipeline printing the id of the first non-empty window of `app_name`
pub fn lookup_command(app_name: &str) -> String {
    format!(
        "command -v GetWindowID >/dev/null 2>&1 && GetWindowID {} --list | awk -F 'id=' \
         '/size=[1-9]/{{print $3; exit 0}}'",
        shell_quote(app_name)
    )
}

/// Looks up the native window id of `app_name`
///
/// Never fails; every problem is logged at debug level and yields `None`.
pub async fn resolve_window_id(
    runner: &dyn CommandRunner,
    app_name: &str,
    timeout: Duration,
) -> Option<String> {
    let spec = CommandSpec::new(SHELL, timeout).arg("-lc").arg(lookup_command(app_name));

    match runner.run(&spec).await {
        Ok(output) if output.success => {
            let id = parse_window_id(&output.stdout);
            if id.is_none() {
                tracing::debug!(app = app_name, "GetWindowID returned no usable id");
            }
            id
        }
        Ok(output) => {
            tracing::debug!(app = app_name, status = %output.exit_description(), "GetWindowID lookup failed");
            None
        }
        Err(e) => {
            tracing::debug!(app = app_name, error = %e, "GetWindowID lookup failed");
            None
        }
    }
}

fn parse_window_id(stdout: &str) -> Option<String> {
    let id = stdout.trim();
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::mock::{MockCommandRunner, MockResponse};

    const TIMEOUT: Duration = Duration::from_millis(2_000);

    #[test]
    fn test_lookup_command_quotes_app_name() {
        let command = lookup_command("It's Here");
        assert!(command.starts_with("command -v GetWindowID >/dev/null 2>&1 && GetWindowID 'It'\\''s Here' --list"));
        assert!(command.ends_with("'/size=[1-9]/{print $3; exit 0}'"));
    }

    #[test]
    fn test_parse_window_id() {
        assert_eq!(parse_window_id("42\n"), Some("42".to_string()));
        assert_eq!(parse_window_id("  \n"), None);
        assert_eq!(parse_window_id("42 43"), None);
        assert_eq!(parse_window_id("abc"), None);
    }

    #[tokio::test]
    async fn test_resolve_returns_id() {
        let runner = MockCommandRunner::new().with_response(SHELL, MockResponse::stdout("42\n"));
        let id = resolve_window_id(&runner, "Example", TIMEOUT).await;
        assert_eq!(id.as_deref(), Some("42"));

        let calls = runner.calls_to(SHELL);
        assert_eq!(calls[0].args[0], "-lc");
        assert_eq!(calls[0].timeout, TIMEOUT);
    }

    #[tokio::test]
    async fn test_resolve_swallows_failures() {
        let runner = MockCommandRunner::new()
            .with_response(SHELL, MockResponse::failure(1, ""))
            .with_response(SHELL, MockResponse::TimedOut)
            .with_response(SHELL, MockResponse::SpawnError("no bash".into()))
            .with_response(SHELL, MockResponse::stdout(""));

        for _ in 0..4 {
            assert_eq!(resolve_window_id(&runner, "Example", TIMEOUT).await, None);
        }
    }
}
