//! # Anthropic Stream Handler
//!
//! Converts Messages API SSE events into [`StreamDelta`]s.
//!
//! Usage is split across the stream: input tokens arrive in `message_start`,
//! output tokens in `message_delta`. Both are recorded in [`ChunkState`] and
//! released with the finish delta on `message_stop`.

use parley_core::usage::{UsageDetails, UsageStats};
use parley_llm::{BlockKind, ChunkState, FinishReason, ProviderError, StreamDelta, ToolCallDelta};
use serde_json::Value;
use tracing::debug;

use crate::types::{AnthropicUsage, SseContentBlock, SseDelta, SseEvent};

/// Translate one native event.
pub fn translate_event(chunk: Value, state: &mut ChunkState) -> Result<Vec<StreamDelta>, ProviderError> {
    let event: SseEvent = serde_json::from_value(chunk)?;
    let deltas = match event {
        SseEvent::MessageStart { message } => {
            state.usage = Some(convert_usage(&message.usage));
            vec![]
        }

        SseEvent::ContentBlockStart { index, content_block } => match content_block {
            SseContentBlock::Text { text } => {
                let _ = state.blocks.insert(index, BlockKind::Text);
                non_empty(text).map(StreamDelta::text).into_iter().collect()
            }
            SseContentBlock::Thinking { thinking, signature } => {
                let _ = state.blocks.insert(index, BlockKind::Reasoning);
                non_empty(thinking)
                    .map(StreamDelta::reasoning)
                    .into_iter()
                    .chain(non_empty(signature).map(StreamDelta::signature))
                    .collect()
            }
            SseContentBlock::ToolUse { id, name } => {
                let _ = state.blocks.insert(index, BlockKind::ToolCall);
                vec![StreamDelta::tool_call(ToolCallDelta {
                    id: Some(id),
                    name: Some(name),
                    arguments: String::new(),
                })]
            }
            SseContentBlock::Other => vec![],
        },

        SseEvent::ContentBlockDelta { delta, .. } => match delta {
            SseDelta::TextDelta { text } => vec![StreamDelta::text(text)],
            SseDelta::ThinkingDelta { thinking } => vec![StreamDelta::reasoning(thinking)],
            SseDelta::InputJsonDelta { partial_json } => vec![StreamDelta::tool_call(ToolCallDelta {
                arguments: partial_json,
                ..ToolCallDelta::default()
            })],
            SseDelta::SignatureDelta { signature } => vec![StreamDelta::signature(signature)],
            SseDelta::Other => vec![],
        },

        SseEvent::ContentBlockStop { index } => match state.blocks.remove(&index) {
            Some(BlockKind::Reasoning) => vec![StreamDelta::reasoning_end()],
            _ => vec![],
        },

        SseEvent::MessageDelta { delta, usage } => {
            if let Some(usage) = usage {
                let stats = state.usage.get_or_insert_with(UsageStats::default);
                stats.completion_tokens = usage.output_tokens;
            }
            if let Some(reason) = delta.stop_reason {
                state.hold_finish(map_stop_reason(&reason));
            }
            vec![]
        }

        SseEvent::MessageStop => state.take_finish().into_iter().collect(),

        SseEvent::Ping => vec![],

        SseEvent::Error { error } => {
            return Err(ProviderError::Api {
                status: 0,
                retryable: matches!(error.error_type.as_str(), "overloaded_error" | "api_error"),
                message: error.message,
                code: Some(error.error_type),
            });
        }

        SseEvent::Unknown => {
            debug!("ignoring unknown Anthropic stream event");
            vec![]
        }
    };
    Ok(deltas)
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// Map a native `stop_reason`.
pub fn map_stop_reason(reason: &str) -> FinishReason {
    match reason {
        "end_turn" | "stop_sequence" | "pause_turn" => FinishReason::Stop,
        "tool_use" => FinishReason::ToolCalls,
        "max_tokens" => FinishReason::Length,
        "refusal" => FinishReason::ContentFilter,
        other => FinishReason::Other(other.to_string()),
    }
}

/// Convert native usage; cache reads become `cached_tokens`.
pub fn convert_usage(usage: &AnthropicUsage) -> UsageStats {
    let stats = UsageStats::new(usage.input_tokens, usage.output_tokens);
    if usage.cache_read_input_tokens == 0 {
        return stats;
    }
    stats.with_details(UsageDetails {
        cached_tokens: usage.cache_read_input_tokens,
        ..UsageDetails::default()
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn run(events: Vec<Value>) -> Vec<StreamDelta> {
        let mut state = ChunkState::new();
        let mut out = Vec::new();
        for event in events {
            out.extend(translate_event(event, &mut state).unwrap());
        }
        out
    }

    fn message_start(input: u64) -> Value {
        json!({"type": "message_start", "message": {"id": "msg_1", "model": "claude-sonnet-4-5", "usage": {"input_tokens": input, "output_tokens": 1}}})
    }

    #[test]
    fn text_stream_with_usage() {
        let deltas = run(vec![
            message_start(20),
            json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
            json!({"type": "ping"}),
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "4"}}),
            json!({"type": "content_block_stop", "index": 0}),
            json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}, "usage": {"output_tokens": 2}}),
            json!({"type": "message_stop"}),
        ]);
        assert_eq!(
            deltas,
            vec![
                StreamDelta::text("4"),
                StreamDelta::finished(FinishReason::Stop).with_usage(Some(UsageStats::new(20, 2))),
            ]
        );
    }

    #[test]
    fn thinking_block_signs_and_closes_on_stop() {
        let deltas = run(vec![
            json!({"type": "content_block_start", "index": 0, "content_block": {"type": "thinking", "thinking": ""}}),
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "thinking_delta", "thinking": "add"}}),
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "signature_delta", "signature": "sig"}}),
            json!({"type": "content_block_stop", "index": 0}),
            json!({"type": "content_block_start", "index": 1, "content_block": {"type": "text", "text": ""}}),
            json!({"type": "content_block_delta", "index": 1, "delta": {"type": "text_delta", "text": "4"}}),
            json!({"type": "content_block_stop", "index": 1}),
        ]);
        assert_eq!(
            deltas,
            vec![
                StreamDelta::reasoning("add"),
                StreamDelta::signature("sig"),
                StreamDelta::reasoning_end(),
                StreamDelta::text("4"),
            ]
        );
    }

    #[test]
    fn signature_on_block_start_is_kept() {
        let deltas = run(vec![json!({
            "type": "content_block_start",
            "index": 0,
            "content_block": {"type": "thinking", "thinking": "", "signature": "early"}
        })]);
        assert_eq!(deltas, vec![StreamDelta::signature("early")]);
    }

    #[test]
    fn tool_use_fragments_carry_id_only_on_start() {
        let deltas = run(vec![
            json!({"type": "content_block_start", "index": 1, "content_block": {"type": "tool_use", "id": "toolu_1", "name": "get_weather", "input": {}}}),
            json!({"type": "content_block_delta", "index": 1, "delta": {"type": "input_json_delta", "partial_json": "{\"city\":"}}),
            json!({"type": "content_block_delta", "index": 1, "delta": {"type": "input_json_delta", "partial_json": "\"Lyon\"}"}}),
            json!({"type": "content_block_stop", "index": 1}),
            json!({"type": "message_delta", "delta": {"stop_reason": "tool_use"}, "usage": {"output_tokens": 9}}),
            json!({"type": "message_stop"}),
        ]);
        assert_eq!(deltas.len(), 4);
        assert_eq!(deltas[0].tool_calls[0].id.as_deref(), Some("toolu_1"));
        assert_eq!(deltas[0].tool_calls[0].name.as_deref(), Some("get_weather"));
        assert!(deltas[1].tool_calls[0].id.is_none());
        assert_eq!(deltas[2].tool_calls[0].arguments, "\"Lyon\"}");
        assert_eq!(deltas[3].finish, Some(FinishReason::ToolCalls));
        assert_eq!(deltas[3].usage, Some(UsageStats::new(0, 9)));
    }

    #[test]
    fn finish_held_until_message_stop() {
        let mut state = ChunkState::new();
        let out = translate_event(
            json!({"type": "message_delta", "delta": {"stop_reason": "max_tokens"}}),
            &mut state,
        )
        .unwrap();
        assert!(out.is_empty());
        assert_eq!(state.pending_finish, Some(FinishReason::Length));
    }

    #[test]
    fn error_event_is_api_error() {
        let mut state = ChunkState::new();
        let err = translate_event(
            json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}),
            &mut state,
        )
        .unwrap_err();
        assert_matches!(err, ProviderError::Api { retryable: true, ref code, .. } if code.as_deref() == Some("overloaded_error"));
    }

    #[test]
    fn cache_reads_become_cached_tokens() {
        let usage = AnthropicUsage {
            input_tokens: 10,
            output_tokens: 0,
            cache_read_input_tokens: 7,
        };
        let stats = convert_usage(&usage);
        assert_eq!(stats.details.unwrap().cached_tokens, 7);
    }

    #[test]
    fn stop_reasons() {
        assert_eq!(map_stop_reason("end_turn"), FinishReason::Stop);
        assert_eq!(map_stop_reason("tool_use"), FinishReason::ToolCalls);
        assert_eq!(map_stop_reason("refusal"), FinishReason::ContentFilter);
        assert_eq!(map_stop_reason("weird"), FinishReason::Other("weird".into()));
    }
}
