//! Strict tool-call argument parsing.
//!
//! Arguments arrive as a serialized JSON string. An empty string means no
//! arguments (`{}`); anything that is not a JSON object is rejected so the
//! tool loop can surface a typed invocation failure.

use serde_json::{Map, Value};

/// Why a tool call's arguments could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ToolArgumentError {
    /// The string is not valid JSON.
    #[error("arguments are not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Valid JSON, but not an object.
    #[error("arguments must be a JSON object, got {found}")]
    NotAnObject {
        /// JSON type that was found.
        found: &'static str,
    },
}

/// Parse serialized tool-call arguments into a JSON object.
pub fn parse_tool_arguments(raw: &str) -> Result<Value, ToolArgumentError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_json::from_str::<Value>(trimmed)? {
        obj @ Value::Object(_) => Ok(obj),
        other => Err(ToolArgumentError::NotAnObject {
            found: json_type(&other),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn parses_object() {
        let value = parse_tool_arguments(r#"{"city": "Lyon"}"#).unwrap();
        assert_eq!(value, json!({"city": "Lyon"}));
    }

    #[test]
    fn empty_is_empty_object() {
        assert_eq!(parse_tool_arguments("").unwrap(), json!({}));
        assert_eq!(parse_tool_arguments("  \n ").unwrap(), json!({}));
    }

    #[test]
    fn truncated_json_is_malformed() {
        assert_matches!(
            parse_tool_arguments(r#"{"city": "Ly"#),
            Err(ToolArgumentError::Malformed(_))
        );
    }

    #[test]
    fn array_is_rejected() {
        let err = parse_tool_arguments("[1, 2]").unwrap_err();
        assert_matches!(err, ToolArgumentError::NotAnObject { found: "array" });
        assert_eq!(err.to_string(), "arguments must be a JSON object, got array");
    }

    #[test]
    fn null_is_rejected() {
        assert_matches!(
            parse_tool_arguments("null"),
            Err(ToolArgumentError::NotAnObject { found: "null" })
        );
    }
}
