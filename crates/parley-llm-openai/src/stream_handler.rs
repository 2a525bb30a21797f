//! # `OpenAI` Stream Handler
//!
//! Converts `chat.completion.chunk` objects into [`StreamDelta`]s:
//! - `delta.content` → text
//! - `delta.reasoning_content` → reasoning (closed by the first text or finish)
//! - `delta.tool_calls[]` → tool-call fragments (only the first carries `id`)
//! - `finish_reason` → held in [`ChunkState`] until the trailing usage chunk
//!   (or the end of the stream) so the finish delta carries usage

use parley_core::usage::{UsageDetails, UsageStats};
use parley_llm::{BlockKind, ChunkState, FinishReason, ProviderError, StreamDelta, ToolCallDelta};
use serde_json::Value;

use crate::types::{ChatCompletionChunk, ChunkChoice, OpenAiUsage};

const REASONING_BLOCK: u64 = 0;

/// Translate one native chunk.
pub fn translate_chunk(chunk: Value, state: &mut ChunkState) -> Result<Vec<StreamDelta>, ProviderError> {
    if let Some(err) = chunk.get("error").filter(|e| e.is_object()) {
        return Err(ProviderError::Api {
            status: 0,
            message: err["message"].as_str().unwrap_or("stream error").to_string(),
            code: err["type"].as_str().or_else(|| err["code"].as_str()).map(String::from),
            retryable: false,
        });
    }

    let chunk: ChatCompletionChunk = serde_json::from_value(chunk)?;
    let mut deltas = Vec::new();

    if let Some(choice) = chunk.choices.into_iter().next() {
        translate_choice(choice, state, &mut deltas);
    }

    if let Some(usage) = chunk.usage {
        state.usage = Some(convert_usage(&usage));
        deltas.extend(state.take_finish());
    }

    Ok(deltas)
}

fn translate_choice(choice: ChunkChoice, state: &mut ChunkState, deltas: &mut Vec<StreamDelta>) {
    let delta = choice.delta;

    if let Some(reasoning) = delta.reasoning_content.filter(|r| !r.is_empty()) {
        let _ = state.blocks.insert(REASONING_BLOCK, BlockKind::Reasoning);
        deltas.push(StreamDelta::reasoning(reasoning));
    }

    if let Some(text) = delta.content.filter(|t| !t.is_empty()) {
        close_reasoning(state, deltas);
        deltas.push(StreamDelta::text(text));
    }

    for call in delta.tool_calls.unwrap_or_default() {
        let function = call.function.unwrap_or_default();
        deltas.push(StreamDelta::tool_call(ToolCallDelta {
            id: call.id,
            name: function.name,
            arguments: function.arguments.unwrap_or_default(),
        }));
    }

    if let Some(reason) = choice.finish_reason {
        close_reasoning(state, deltas);
        state.hold_finish(map_finish_reason(&reason));
    }
}

fn close_reasoning(state: &mut ChunkState, deltas: &mut Vec<StreamDelta>) {
    if state.blocks.remove(&REASONING_BLOCK).is_some() {
        deltas.push(StreamDelta::reasoning_end());
    }
}

/// Map a native `finish_reason`.
pub fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        other => FinishReason::Other(other.to_string()),
    }
}

/// Convert native usage, keeping detail counters when any are reported.
pub fn convert_usage(usage: &OpenAiUsage) -> UsageStats {
    let stats = UsageStats::new(usage.prompt_tokens, usage.completion_tokens);
    if usage.prompt_tokens_details.is_none() && usage.completion_tokens_details.is_none() {
        return stats;
    }
    let prompt = usage.prompt_tokens_details.clone().unwrap_or_default();
    let completion = usage.completion_tokens_details.clone().unwrap_or_default();
    stats.with_details(UsageDetails {
        cached_tokens: prompt.cached_tokens,
        audio_tokens: prompt.audio_tokens.saturating_add(completion.audio_tokens),
        reasoning_tokens: completion.reasoning_tokens,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content_chunk(text: &str, finish: Option<&str>) -> Value {
        json!({
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"content": text}, "finish_reason": finish}]
        })
    }

    fn run(chunks: Vec<Value>) -> (Vec<StreamDelta>, ChunkState) {
        let mut state = ChunkState::new();
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend(translate_chunk(chunk, &mut state).unwrap());
        }
        (out, state)
    }

    #[test]
    fn text_chunks_become_text_deltas() {
        let (deltas, _) = run(vec![
            json!({"choices": [{"index": 0, "delta": {"role": "assistant", "content": ""}}]}),
            content_chunk("Hel", None),
            content_chunk("lo", None),
        ]);
        assert_eq!(deltas, vec![StreamDelta::text("Hel"), StreamDelta::text("lo")]);
    }

    #[test]
    fn finish_is_held_until_usage_chunk() {
        let (deltas, state) = run(vec![
            content_chunk("4", Some("stop")),
        ]);
        assert_eq!(deltas, vec![StreamDelta::text("4")]);
        assert_eq!(state.pending_finish, Some(FinishReason::Stop));

        let (deltas, state) = run(vec![
            content_chunk("4", Some("stop")),
            json!({"choices": [], "usage": {"prompt_tokens": 12, "completion_tokens": 1}}),
        ]);
        assert_eq!(
            deltas,
            vec![
                StreamDelta::text("4"),
                StreamDelta::finished(FinishReason::Stop).with_usage(Some(UsageStats::new(12, 1))),
            ]
        );
        assert!(state.pending_finish.is_none());
    }

    #[test]
    fn tool_call_fragments() {
        let (deltas, state) = run(vec![
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "id": "call_1", "type": "function", "function": {"name": "get_weather", "arguments": ""}}
            ]}}]}),
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "function": {"arguments": "{\"city\":"}}
            ]}}]}),
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "function": {"arguments": "\"Lyon\"}"}}
            ]}}]}),
            json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "tool_calls"}]}),
        ]);
        assert_eq!(deltas.len(), 3);
        assert_eq!(deltas[0].tool_calls[0].id.as_deref(), Some("call_1"));
        assert_eq!(deltas[0].tool_calls[0].name.as_deref(), Some("get_weather"));
        assert!(deltas[1].tool_calls[0].id.is_none());
        assert_eq!(deltas[2].tool_calls[0].arguments, "\"Lyon\"}");
        assert_eq!(state.pending_finish, Some(FinishReason::ToolCalls));
    }

    #[test]
    fn reasoning_closed_by_first_text() {
        let (deltas, _) = run(vec![
            json!({"choices": [{"index": 0, "delta": {"reasoning_content": "think"}}]}),
            content_chunk("answer", None),
        ]);
        assert_eq!(
            deltas,
            vec![
                StreamDelta::reasoning("think"),
                StreamDelta::reasoning_end(),
                StreamDelta::text("answer"),
            ]
        );
    }

    #[test]
    fn in_stream_error_is_api_error() {
        let mut state = ChunkState::new();
        let err = translate_chunk(
            json!({"error": {"message": "overloaded", "type": "server_error"}}),
            &mut state,
        )
        .unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 0, .. }));
        assert!(err.to_string().contains("overloaded"));
    }

    #[test]
    fn finish_reason_mapping() {
        assert_eq!(map_finish_reason("stop"), FinishReason::Stop);
        assert_eq!(map_finish_reason("tool_calls"), FinishReason::ToolCalls);
        assert_eq!(map_finish_reason("length"), FinishReason::Length);
        assert_eq!(map_finish_reason("content_filter"), FinishReason::ContentFilter);
        assert_eq!(map_finish_reason("weird"), FinishReason::Other("weird".into()));
    }

    #[test]
    fn usage_details_converted() {
        let usage: OpenAiUsage = serde_json::from_value(json!({
            "prompt_tokens": 100,
            "completion_tokens": 50,
            "prompt_tokens_details": {"cached_tokens": 40},
            "completion_tokens_details": {"reasoning_tokens": 30}
        }))
        .unwrap();
        let stats = convert_usage(&usage);
        assert_eq!(stats.prompt_tokens, 100);
        let details = stats.details.unwrap();
        assert_eq!(details.cached_tokens, 40);
        assert_eq!(details.reasoning_tokens, 30);
    }

    #[test]
    fn usage_without_details() {
        let stats = convert_usage(&OpenAiUsage {
            prompt_tokens: 1,
            completion_tokens: 2,
            ..OpenAiUsage::default()
        });
        assert_eq!(stats, UsageStats::new(1, 2));
    }
}
