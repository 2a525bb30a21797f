//! Neutral payload to Chat Completions messages.
//!
//! - Units with an image become an array of `text` / `image_url` parts
//! - Assistant units announcing tool calls carry `tool_calls` (and no
//!   `content` when they have no text)
//! - Each tool unit becomes its own `tool` message keyed by `tool_call_id`

use parley_core::messages::Role;
use parley_core::tools::{ToolCallRecord, ToolDefinition};
use parley_llm::{PayloadPart, PayloadUnit, normalize_schema};
use serde_json::{Value, json};

use crate::types::{ChatFunctionCall, ChatFunctionDef, ChatMessage, ChatTool, ChatToolCall};

/// Convert the neutral payload into request messages, one per unit.
pub fn convert_payload(units: &[PayloadUnit]) -> Vec<ChatMessage> {
    units.iter().map(convert_unit).collect()
}

fn convert_unit(unit: &PayloadUnit) -> ChatMessage {
    match unit.role {
        Role::Tool => ChatMessage {
            role: "tool".into(),
            content: Some(Value::String(unit.text())),
            tool_calls: None,
            tool_call_id: unit.tool_call_id.clone(),
        },
        Role::Assistant if !unit.tool_calls.is_empty() => {
            let text = unit.text();
            ChatMessage {
                role: "assistant".into(),
                content: (!text.is_empty()).then_some(Value::String(text)),
                tool_calls: Some(unit.tool_calls.iter().map(convert_tool_call).collect()),
                tool_call_id: None,
            }
        }
        role => ChatMessage {
            role: role.as_str().into(),
            content: Some(convert_content(unit)),
            tool_calls: None,
            tool_call_id: None,
        },
    }
}

fn convert_content(unit: &PayloadUnit) -> Value {
    if !unit.has_image() {
        return Value::String(unit.text());
    }
    Value::Array(
        unit.parts
            .iter()
            .map(|part| match part {
                PayloadPart::Text(text) => json!({"type": "text", "text": text}),
                PayloadPart::Image { mime_type, data } => json!({
                    "type": "image_url",
                    "image_url": {"url": image_data_url(mime_type, data)},
                }),
            })
            .collect(),
    )
}

fn convert_tool_call(call: &ToolCallRecord) -> ChatToolCall {
    ChatToolCall {
        id: Some(call.id.clone()),
        kind: "function".into(),
        function: ChatFunctionCall {
            name: call.name.clone(),
            arguments: if call.arguments.trim().is_empty() {
                "{}".into()
            } else {
                call.arguments.clone()
            },
        },
    }
}

/// `data:` URL for an inline image.
pub fn image_data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{mime_type};base64,{base64_data}")
}

/// Convert registry tool definitions into function declarations.
pub fn convert_tools(tools: &[ToolDefinition]) -> Vec<ChatTool> {
    tools
        .iter()
        .map(|t| ChatTool {
            kind: "function",
            function: ChatFunctionDef {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: normalize_schema(&t.json_schema),
            },
        })
        .collect()
}
