//! Best-effort JSON recovery from model output.
//!
//! Reasoning models often wrap JSON in prose or markdown fences. The
//! extractor tries, in order: the whole text, the first fenced block,
//! then the outermost `{...}` or `[...]` span. Nothing here ever fails;
//! unrecoverable text simply yields `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Matches a markdown code fence, optionally tagged `json`.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)```").expect("valid regex")
});

/// Pull a JSON value out of free-form model text.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return structured(value);
    }

    for caps in FENCE_RE.captures_iter(trimmed) {
        if let Some(body) = caps.get(1) {
            if let Ok(value) = serde_json::from_str::<Value>(body.as_str().trim()) {
                if let Some(value) = structured(value) {
                    return Some(value);
                }
            }
        }
    }

    outer_span(trimmed, '{', '}').or_else(|| outer_span(trimmed, '[', ']'))
}

/// Parse the span from the first `open` to the last `close`.
fn outer_span(text: &str, open: char, close: char) -> Option<Value> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&text[start..=end])
        .ok()
        .and_then(structured)
}

/// Only objects and arrays count; a bare number or string is just text.
fn structured(value: Value) -> Option<Value> {
    match value {
        Value::Object(_) | Value::Array(_) => Some(value),
        _ => None,
    }
}
