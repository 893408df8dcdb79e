//! JSON utilities for extracting and parsing model replies

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extract JSON content from markdown code blocks or raw text
///
/// Handles:
/// - ```json blocks
/// - Generic ``` blocks
/// - Prose around a bare object or array
/// - Raw JSON text
pub fn extract_json(text: &str) -> String {
    if let Some(start) = text.find("```json") {
        let body_start = start + "```json".len();
        let body_end = text[body_start..]
            .find("```")
            .map(|pos| pos + body_start)
            .unwrap_or(text.len());
        return text[body_start..body_end].trim().to_string();
    }

    if let Some(start) = text.find("```") {
        let body_start = start + 3;
        let body_end = text[body_start..]
            .find("```")
            .map(|pos| pos + body_start)
            .unwrap_or(text.len());
        return text[body_start..body_end].trim().to_string();
    }

    let trimmed = text.trim();
    let open = trimmed.find(['{', '[']);
    let close = trimmed.rfind(['}', ']']);
    match (open, close) {
        (Some(open), Some(close)) if close > open => trimmed[open..=close].to_string(),
        _ => trimmed.to_string(),
    }
}

/// Parse a model reply into a typed structure
pub fn parse_json<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    serde_json::from_str(&extract_json(text))
}

/// Return the array itself, or the array stored under `key` in a wrapping object
///
/// Models asked for a list frequently answer `{"tasks": [...]}` instead.
pub fn unwrap_array(value: Value, key: &str) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// First `max` characters of `text`, with an ellipsis when truncated
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max).collect::<String>())
    }
}
