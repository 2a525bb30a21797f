//! Tool declarations and call records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool the model may call, as listed by the tool registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Function name.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema for the arguments object.
    pub json_schema: Value,
}

impl ToolDefinition {
    /// Create a tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, json_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            json_schema,
        }
    }

    /// Names listed in the schema's `required` array.
    pub fn required_fields(&self) -> Vec<&str> {
        self.json_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|req| req.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// A tool call announced by the backend.
///
/// `arguments` holds the raw serialized JSON exactly as the backend streamed
/// it; parsing happens in the tool loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRecord {
    /// Call id, unique within one backend call attempt.
    pub id: String,
    /// Function name.
    pub name: String,
    /// Serialized arguments.
    pub arguments: String,
    /// Result returned by the registry, once executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ToolCallRecord {
    /// Create an unexecuted call record.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
            result: None,
        }
    }

    /// Whether the call has been executed.
    pub fn is_executed(&self) -> bool {
        self.result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_fields_from_schema() {
        let def = ToolDefinition::new(
            "get_weather",
            "Look up weather",
            json!({"type": "object", "properties": {"city": {"type": "string"}}, "required": ["city"]}),
        );
        assert_eq!(def.required_fields(), vec!["city"]);
    }

    #[test]
    fn required_fields_missing() {
        let def = ToolDefinition::new("noop", "", json!({"type": "object"}));
        assert!(def.required_fields().is_empty());
    }

    #[test]
    fn record_serde_camel_case() {
        let rec = ToolCallRecord::new("call_1", "get_weather", "{}");
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["id"], "call_1");
        assert!(json.get("result").is_none());
        assert!(!rec.is_executed());
    }

    #[test]
    fn definition_uses_json_schema_key() {
        let def = ToolDefinition::new("t", "d", json!({}));
        let json = serde_json::to_value(&def).unwrap();
        assert!(json.get("jsonSchema").is_some());
    }
}
