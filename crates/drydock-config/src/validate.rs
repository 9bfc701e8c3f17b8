//! Validation helpers for raw configuration values.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::LogFormatSetting;

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for any other value.
pub fn parse_bool(field: &'static str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(field, "not_a_boolean", raw)),
    }
}

/// Parse a strictly positive integer.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a number or is zero.
pub fn parse_positive_u64(field: &'static str, raw: &str) -> ConfigResult<u64> {
    let value = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(field, "not_a_number", raw))?;
    if value == 0 {
        return Err(ConfigError::invalid(field, "must_be_positive", raw));
    }
    Ok(value)
}

/// Parse a positive number of seconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a positive integer.
pub fn parse_secs(field: &'static str, raw: &str) -> ConfigResult<Duration> {
    parse_positive_u64(field, raw).map(Duration::from_secs)
}

/// Parse a single absolute path.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for empty or relative paths.
pub fn parse_absolute_path(field: &'static str, raw: &str) -> ConfigResult<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::invalid(field, "empty_path", raw));
    }
    let path = PathBuf::from(trimmed);
    if !path.is_absolute() {
        return Err(ConfigError::invalid(field, "must_be_absolute", raw));
    }
    Ok(path)
}

/// Parse a comma-separated list of absolute paths, preserving order.
///
/// Blank entries (for example a trailing comma) are skipped.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when any entry is relative.
pub fn parse_path_list(field: &'static str, raw: &str) -> ConfigResult<Vec<PathBuf>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_absolute_path(field, entry))
        .collect()
}

/// Parse an `http` or `https` URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for malformed URLs or other schemes.
pub fn parse_http_url(field: &'static str, raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::invalid(field, "invalid_url", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::invalid(field, "unsupported_scheme", raw)),
    }
}

/// Parse a non-empty, trimmed string.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the trimmed value is empty.
pub fn parse_non_empty(field: &'static str, raw: &str) -> ConfigResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::invalid(field, "empty_value", raw));
    }
    Ok(trimmed.to_string())
}

/// Parse a log format selection.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for unknown formats.
pub fn parse_log_format(field: &'static str, raw: &str) -> ConfigResult<LogFormatSetting> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(LogFormatSetting::Auto),
        "json" => Ok(LogFormatSetting::Json),
        "pretty" | "text" => Ok(LogFormatSetting::Pretty),
        _ => Err(ConfigError::invalid(field, "unknown_log_format", raw)),
    }
}
