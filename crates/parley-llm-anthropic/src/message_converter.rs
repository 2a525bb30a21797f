//! Neutral payload to Messages API shape.
//!
//! System units are lifted into the top-level `system` string. Tool results
//! are `tool_result` blocks inside `user` messages; a run of consecutive tool
//! units shares one message.

use parley_core::messages::Role;
use parley_core::tools::{ToolCallRecord, ToolDefinition};
use parley_llm::{PayloadPart, PayloadUnit, normalize_schema, parse_tool_arguments};
use serde_json::{Map, Value};
use tracing::warn;

use crate::types::{
    AnthropicTool, MessageParam, image_block, text_block, thinking_block, tool_result_block,
    tool_use_block,
};

/// Converted conversation: system prompt plus alternating messages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvertedPayload {
    /// Joined system text, if any system unit was present.
    pub system: Option<String>,
    /// User / assistant messages.
    pub messages: Vec<MessageParam>,
}

/// Convert the neutral payload.
pub fn convert_payload(units: &[PayloadUnit]) -> ConvertedPayload {
    let mut system: Vec<String> = Vec::new();
    let mut messages: Vec<MessageParam> = Vec::new();

    for unit in units {
        match unit.role {
            Role::System => system.push(unit.text()),
            Role::Tool => {
                let block = tool_result_block(unit.tool_call_id.as_deref().unwrap_or_default(), &unit.text());
                match messages.last_mut() {
                    Some(last) if is_tool_result_message(last) => last.content.push(block),
                    _ => messages.push(MessageParam {
                        role: "user".into(),
                        content: vec![block],
                    }),
                }
            }
            Role::Assistant => messages.push(MessageParam {
                role: "assistant".into(),
                content: assistant_blocks(unit),
            }),
            Role::User => messages.push(MessageParam {
                role: "user".into(),
                content: content_blocks(unit),
            }),
        }
    }

    ConvertedPayload {
        system: (!system.is_empty()).then(|| system.join("\n\n")),
        messages,
    }
}

fn is_tool_result_message(msg: &MessageParam) -> bool {
    msg.role == "user"
        && !msg.content.is_empty()
        && msg.content.iter().all(|b| b["type"] == "tool_result")
}

fn content_blocks(unit: &PayloadUnit) -> Vec<Value> {
    unit.parts
        .iter()
        .map(|part| match part {
            PayloadPart::Text(text) => text_block(text),
            PayloadPart::Image { mime_type, data } => image_block(data, mime_type),
        })
        .collect()
}

/// Signed thinking leads; text and tool calls follow.
fn assistant_blocks(unit: &PayloadUnit) -> Vec<Value> {
    let mut blocks: Vec<Value> = unit
        .reasoning
        .iter()
        .map(|r| thinking_block(&r.text, &r.signature))
        .collect();
    blocks.extend(
        content_blocks(unit)
            .into_iter()
            .filter(|b| b["type"] != "text" || b["text"].as_str().is_some_and(|t| !t.is_empty())),
    );
    blocks.extend(unit.tool_calls.iter().map(convert_tool_call));
    if blocks.is_empty() {
        blocks.push(text_block(""));
    }
    blocks
}

fn convert_tool_call(call: &ToolCallRecord) -> Value {
    let input = parse_tool_arguments(&call.arguments).unwrap_or_else(|e| {
        warn!(tool = %call.name, call_id = %call.id, error = %e, "replaying tool call with unparseable arguments as {{}}");
        Value::Object(Map::new())
    });
    tool_use_block(&call.id, &call.name, input)
}

/// Convert registry tool definitions.
pub fn convert_tools(tools: &[ToolDefinition]) -> Vec<AnthropicTool> {
    tools
        .iter()
        .map(|t| AnthropicTool {
            name: t.name.clone(),
            description: t.description.clone(),
            input_schema: normalize_schema(&t.json_schema),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::messages::{Message, ReasoningBlock};
    use serde_json::json;

    fn unit(role: Role, text: &str) -> PayloadUnit {
        PayloadUnit {
            role,
            parts: vec![PayloadPart::Text(text.into())],
            tool_calls: vec![],
            tool_call_id: None,
            name: None,
            reasoning: None,
        }
    }

    fn tool_unit(call: &ToolCallRecord, result: &str) -> PayloadUnit {
        let msg = Message::tool_result(call, result);
        PayloadUnit {
            role: Role::Tool,
            parts: vec![PayloadPart::Text(msg.content)],
            tool_calls: vec![],
            tool_call_id: msg.tool_call_id,
            name: msg.name,
            reasoning: None,
        }
    }

    #[test]
    fn system_lifted_to_top_level() {
        let out = convert_payload(&[
            unit(Role::System, "be terse"),
            unit(Role::System, "answer in French"),
            unit(Role::User, "2+2?"),
        ]);
        assert_eq!(out.system.as_deref(), Some("be terse\n\nanswer in French"));
        assert_eq!(out.messages.len(), 1);
        assert_eq!(out.messages[0].content, vec![json!({"type": "text", "text": "2+2?"})]);
    }

    #[test]
    fn no_system_field_without_system_units() {
        assert!(convert_payload(&[unit(Role::User, "hi")]).system.is_none());
    }

    #[test]
    fn image_part_becomes_base64_source() {
        let mut u = unit(Role::User, "what is this");
        u.parts.push(PayloadPart::Image {
            mime_type: "image/png".into(),
            data: "AAEC".into(),
        });
        let out = convert_payload(&[u]);
        assert_eq!(
            out.messages[0].content[1],
            json!({"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "AAEC"}})
        );
    }

    #[test]
    fn consecutive_tool_results_share_one_user_message() {
        let a = ToolCallRecord::new("toolu_a", "get_weather", r#"{"city":"Lyon"}"#);
        let b = ToolCallRecord::new("toolu_b", "get_time", "");
        let mut assistant = unit(Role::Assistant, "");
        assistant.parts.clear();
        assistant.tool_calls = vec![a.clone(), b.clone()];

        let out = convert_payload(&[
            unit(Role::User, "weather and time in Lyon?"),
            assistant,
            tool_unit(&a, r#"{"temp":21}"#),
            tool_unit(&b, r#""12:00""#),
        ]);

        assert_eq!(out.messages.len(), 3);
        assert_eq!(
            out.messages[1].content,
            vec![
                json!({"type": "tool_use", "id": "toolu_a", "name": "get_weather", "input": {"city": "Lyon"}}),
                json!({"type": "tool_use", "id": "toolu_b", "name": "get_time", "input": {}}),
            ]
        );
        assert_eq!(out.messages[2].role, "user");
        assert_eq!(
            out.messages[2].content,
            vec![
                json!({"type": "tool_result", "tool_use_id": "toolu_a", "content": "{\"temp\":21}"}),
                json!({"type": "tool_result", "tool_use_id": "toolu_b", "content": "\"12:00\""}),
            ]
        );
    }

    #[test]
    fn tool_results_not_merged_into_plain_user_message() {
        let a = ToolCallRecord::new("toolu_a", "f", "{}");
        let out = convert_payload(&[unit(Role::User, "hi"), tool_unit(&a, "ok")]);
        assert_eq!(out.messages.len(), 2);
    }

    #[test]
    fn assistant_text_kept_before_tool_use() {
        let mut assistant = unit(Role::Assistant, "Checking.");
        assistant.tool_calls = vec![ToolCallRecord::new("toolu_a", "f", "not json")];
        let out = convert_payload(&[assistant]);
        assert_eq!(out.messages[0].content[0], json!({"type": "text", "text": "Checking."}));
        assert_eq!(out.messages[0].content[1]["input"], json!({}));
    }

    #[test]
    fn signed_thinking_leads_assistant_blocks() {
        let mut assistant = unit(Role::Assistant, "Checking.");
        assistant.tool_calls = vec![ToolCallRecord::new("toolu_a", "f", "{}")];
        assistant.reasoning = ReasoningBlock::signed("need f", Some("SIG".into()));
        let out = convert_payload(&[assistant]);
        assert_eq!(
            out.messages[0].content,
            vec![
                json!({"type": "thinking", "thinking": "need f", "signature": "SIG"}),
                json!({"type": "text", "text": "Checking."}),
                json!({"type": "tool_use", "id": "toolu_a", "name": "f", "input": {}}),
            ]
        );
    }

    #[test]
    fn tools_keep_name_description_required() {
        let def = ToolDefinition::new(
            "get_weather",
            "Weather lookup",
            json!({"type": "object", "properties": {"days": {"type": "array"}}, "required": ["days"]}),
        );
        let tools = convert_tools(&[def]);
        assert_eq!(tools[0].name, "get_weather");
        assert_eq!(tools[0].description, "Weather lookup");
        assert_eq!(tools[0].input_schema["required"], json!(["days"]));
        assert_eq!(tools[0].input_schema["properties"]["days"]["items"], json!({}));
    }
}
