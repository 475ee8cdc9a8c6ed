//! Helpers that operate on the text of a single fragment file.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Drop every space, line break (`\n`, `\r\n` or `\r`) and tab. Not
/// JSON-aware: whitespace inside string values is removed as well.
pub fn strip_whitespace(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '\n' | '\r' | '\t'))
        .collect()
}

/// Strip every `[` and `]` character from both ends.
pub fn strip_brackets(body: &str) -> &str {
    body.trim_matches(|c| c == '[' || c == ']')
}

/// Interior of a fragment as written by the textual merge.
pub fn textual_body(raw: &str) -> String {
    strip_brackets(&strip_whitespace(raw)).to_string()
}

/// Parse a fragment into its top-level array elements.
pub fn parse_elements(raw: &str, origin: &Path) -> Result<Vec<Value>> {
    let json: Value = serde_json::from_str(raw)
        .with_context(|| format!("parsing {}", origin.display()))?;

    match json {
        Value::Array(arr) => Ok(arr),
        other => bail!(
            "File {} is not a JSON array (found {})",
            origin.display(),
            kind(&other)
        ),
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
