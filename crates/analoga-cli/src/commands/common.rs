//! Shared CLI helpers used across multiple commands.

use crate::error::ConfigError;

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, f32), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter format: '{}' (expected NAME=VALUE)", s))?;
    let value: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid value '{}' for parameter '{}'", value, key))?;
    Ok((key.trim().to_string(), value))
}

/// Parse a comma-separated note list such as `57,60,64`.
pub fn parse_note_list(s: &str) -> Result<Vec<u8>, ConfigError> {
    s.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| {
            n.parse::<u8>()
                .ok()
                .filter(|&note| note <= 127)
                .ok_or_else(|| ConfigError::InvalidValue {
                    what: "note".into(),
                    value: n.to_string(),
                })
        })
        .collect()
}
