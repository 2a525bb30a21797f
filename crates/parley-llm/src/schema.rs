//! Tool parameter schema normalization.
//!
//! Backends reject some JSON Schema shapes that registries commonly produce.
//! Normalization applies recursively:
//! - `{"type": "array"}` without `items` gains `"items": {}`
//! - a list-valued `type` (e.g. `["string", "null"]`) keeps its first
//!   non-null entry
//! - a missing or non-object root becomes `{"type": "object", "properties": {}}`
//!
//! Every other key (including `required`, `description`, `enum`) is kept
//! untouched.

use serde_json::{Map, Value, json};

/// Normalize a tool parameter schema for declaration to a backend.
pub fn normalize_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = normalize_node(map);
            if out.get("type").is_none() && out.get("properties").is_some() {
                let _ = out.insert("type".into(), json!("object"));
            }
            Value::Object(out)
        }
        _ => json!({"type": "object", "properties": {}}),
    }
}

fn normalize_node(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        let normalized = match key.as_str() {
            "type" => collapse_type(value),
            "properties" | "$defs" | "definitions" | "patternProperties" => match value {
                Value::Object(props) => Value::Object(
                    props
                        .iter()
                        .map(|(name, sub)| (name.clone(), normalize_value(sub)))
                        .collect(),
                ),
                other => other.clone(),
            },
            "items" | "additionalProperties" | "not" => normalize_value(value),
            "anyOf" | "oneOf" | "allOf" | "prefixItems" => match value {
                Value::Array(items) => Value::Array(items.iter().map(normalize_value).collect()),
                other => other.clone(),
            },
            _ => value.clone(),
        };
        let _ = out.insert(key.clone(), normalized);
    }

    if out.get("type").and_then(Value::as_str) == Some("array") && !out.contains_key("items") {
        let _ = out.insert("items".into(), json!({}));
    }
    out
}

fn normalize_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(normalize_node(map)),
        other => other.clone(),
    }
}

fn collapse_type(value: &Value) -> Value {
    match value {
        Value::Array(types) => types
            .iter()
            .find(|t| t.as_str().is_some_and(|s| s != "null"))
            .or_else(|| types.first())
            .cloned()
            .unwrap_or_else(|| json!("string")),
        other => other.clone(),
    }
}
