//! Ready-made warmers.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::WarmError;

/// Warmer that loads a JSON object from `path` on every run.
///
/// Top-level keys become cache keys. Any document that is not an object is
/// rejected as invalid output.
pub fn json_file_warmer(
    path: impl Into<PathBuf>,
) -> impl Fn() -> Result<HashMap<String, Value>, WarmError> + Send + Sync + 'static {
    let path = path.into();
    move || {
        let raw = std::fs::read_to_string(&path)?;
        parse_json_object(&raw)
    }
}

/// Parses a JSON document into a key/value mapping.
pub fn parse_json_object(raw: &str) -> Result<HashMap<String, Value>, WarmError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(WarmError::InvalidOutput(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
