//! Redaction of sensitive values before they reach logs or Sentry.

use axum::http::Uri;
use serde_json::Value;

/// Replacement for redacted values.
pub const REDACTED: &str = "[REDACTED]";

/// Substrings that mark a key as sensitive (compared lowercase).
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "token",
    "secret",
    "apikey",
    "api_key",
    "authorization",
    "cookie",
    "session",
];

/// Data URIs longer than this are truncated when logged.
const MAX_DATA_URI_CHARS: usize = 48;

/// Whether a field or parameter name holds a credential.
#[must_use]
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|sensitive| key.contains(sensitive))
}

/// Copy of `value` with sensitive keys redacted and inline images shortened.
#[must_use]
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = if is_sensitive_key(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        sanitize_json(value)
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_json).collect()),
        Value::String(s) => Value::String(truncate_data_uri(s)),
        other => other.clone(),
    }
}

fn truncate_data_uri(s: &str) -> String {
    if !s.starts_with("data:") || s.len() <= MAX_DATA_URI_CHARS {
        return s.to_string();
    }
    let header = s.split_once(',').map_or("data:", |(meta, _)| meta);
    format!("{header},[{} chars]", s.len())
}

/// Path and query of `uri` with sensitive query values redacted.
#[must_use]
pub fn redact_uri(uri: &Uri) -> String {
    let Some(query) = uri.query() else {
        return uri.path().to_string();
    };

    let redacted = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{key}={REDACTED}"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{redacted}", uri.path())
}
