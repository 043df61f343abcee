//! Request validation
//!
//! Turns untyped tool arguments into a [`ScreenshotRequest`], applying field
//! defaults. Side-effect free; runs before any subprocess is started.

use serde_json::Value;

use crate::{
    config::{DEFAULT_REQUEST_TIMEOUT_MS, MIN_REQUEST_TIMEOUT_MS},
    error::{ScreenshotError, ScreenshotResult},
    model::{AppSelector, ImageFormat, ScreenshotArgs, ScreenshotRequest},
};

const MISSING_SELECTOR: &str = "bundleId or appName is required";

/// Validates raw JSON arguments
///
/// # Examples
///
/// ```
/// use screenshot_mac_mcp::request::validate;
///
/// let request = validate(&serde_json::json!({ "appName": "Safari" })).unwrap();
/// assert_eq!(request.timeout_ms, 30_000);
///
/// assert!(validate(&serde_json::json!({})).is_err());
/// ```
pub fn validate(raw: &Value) -> ScreenshotResult<ScreenshotRequest> {
    if !raw.is_object() {
        return Err(ScreenshotError::validation("arguments must be a JSON object"));
    }
    let args: ScreenshotArgs = serde_json::from_value(raw.clone())
        .map_err(|e| ScreenshotError::validation(format!("invalid arguments: {e}")))?;
    validate_args(args)
}

/// Validates already-deserialized tool arguments
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_args(args: ScreenshotArgs) -> ScreenshotResult<ScreenshotRequest> {
    let mut issues = Vec::new();

    let bundle_id = selector_field("bundleId", args.bundle_id, &mut issues);
    let app_name = selector_field("appName", args.app_name, &mut issues);
    // A blank or mistyped selector already explains itself.
    let selector_reported = !issues.is_empty();

    let window_index = match args.window_index {
        None => 0,
        Some(value) => match non_negative_integer(&value) {
            // The script clamps to the last window anyway.
            Some(index) => u32::try_from(index).unwrap_or(u32::MAX),
            None => {
                issues.push("windowIndex must be a non-negative integer".to_string());
                0
            }
        },
    };

    let format = match args.format {
        None => ImageFormat::default(),
        Some(value) => match value.as_str().and_then(ImageFormat::parse) {
            Some(format) => format,
            None => {
                issues.push("format must be one of: png, jpg".to_string());
                ImageFormat::default()
            }
        },
    };

    let include_shadow = bool_field("includeShadow", args.include_shadow, &mut issues);
    let prefer_window_id = bool_field("preferWindowId", args.prefer_window_id, &mut issues);

    let timeout_ms = match args.timeout_ms {
        None => DEFAULT_REQUEST_TIMEOUT_MS,
        Some(value) => match non_negative_integer(&value) {
            Some(ms) if ms >= MIN_REQUEST_TIMEOUT_MS => ms,
            _ => {
                issues.push(format!(
                    "timeoutMs must be an integer of at least {MIN_REQUEST_TIMEOUT_MS}"
                ));
                DEFAULT_REQUEST_TIMEOUT_MS
            }
        },
    };

    let selector = AppSelector::new(bundle_id, app_name);
    if selector.is_none() && !selector_reported {
        issues.insert(0, MISSING_SELECTOR.to_string());
    }

    match selector {
        Some(selector) if issues.is_empty() => Ok(ScreenshotRequest {
            selector,
            window_index,
            format,
            include_shadow,
            timeout_ms,
            prefer_window_id,
        }),
        _ => Err(ScreenshotError::Validation { issues }),
    }
}

/// Trims a selector string; blank or non-string values are reported
fn selector_field(name: &str, value: Option<Value>, issues: &mut Vec<String>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                issues.push(format!("{name} must not be empty"));
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(_) => {
            issues.push(format!("{name} must be a string"));
            None
        }
    }
}

fn bool_field(name: &str, value: Option<Value>, issues: &mut Vec<String>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(_) => {
            issues.push(format!("{name} must be a boolean"));
            false
        }
    }
}

/// Accepts JSON integers and integral floats such as `2.0`
fn non_negative_integer(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}
