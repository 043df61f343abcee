//! Centralized defaults and runtime configuration.
//!
//! Request-level knobs (`timeoutMs`, `windowIndex`, ...) travel with each
//! request. Process-level settings are read from the environment:
//!
//! | Environment Variable | Default | Description |
//! |---------------------|---------|-------------|
//! | `MCP_SCREENSHOT_MAC_TTL_MS` | 600000 | Delay before a capture directory is deleted; `0` disables deletion |
//! | `SCREENSHOT_MAC_LOG_FORMAT` | text | `json` switches the stderr log formatter |

/// Environment variable overriding the cleanup TTL.
pub const TTL_ENV_VAR: &str = "MCP_SCREENSHOT_MAC_TTL_MS";

/// Environment variable selecting the log formatter.
pub const LOG_FORMAT_ENV_VAR: &str = "SCREENSHOT_MAC_LOG_FORMAT";

/// Default time-to-live for capture directories (10 minutes).
pub const DEFAULT_TTL_MS: u64 = 600_000;

/// Default per-subprocess timeout for a request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Smallest accepted `timeoutMs`.
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 1_000;

/// Interval at which the automation script re-checks for a first window.
pub const WINDOW_POLL_INTERVAL_MS: u64 = 100;

/// Settle delay after activating the target application, in milliseconds.
///
/// Baked into the embedded automation script; kept here for reference by
/// tests and docs.
pub const ACTIVATE_SETTLE_MS: u64 = 250;

/// Budget the automation script may spend polling for a first window.
///
/// Half of the request timeout, leaving the other half for activation,
/// geometry queries and interpreter start-up.
pub fn window_wait_budget_ms(timeout_ms: u64) -> u64 {
    timeout_ms / 2
}

/// Parses a TTL override.
///
/// Accepts any finite, non-negative number (fractions are truncated). Returns
/// `None` for everything else so callers fall back to the default; a bad
/// value never disables cleanup.
fn parse_ttl(raw: &str) -> Option<u64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value as u64)
}

/// Get the cleanup TTL, checking the environment variable override.
///
/// Override with: `MCP_SCREENSHOT_MAC_TTL_MS`
///
/// # Example
///
/// ```bash
/// # Keep screenshots for one minute
/// export MCP_SCREENSHOT_MAC_TTL_MS=60000
///
/// # Never delete screenshots
/// export MCP_SCREENSHOT_MAC_TTL_MS=0
/// ```
pub fn cleanup_ttl_ms() -> u64 {
    std::env::var(TTL_ENV_VAR)
        .ok()
        .and_then(|s| parse_ttl(&s))
        .unwrap_or(DEFAULT_TTL_MS)
}

/// Whether logs should be emitted as JSON lines.
pub fn json_logs_enabled() -> bool {
    std::env::var(LOG_FORMAT_ENV_VAR)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
