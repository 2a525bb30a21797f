//! Scripted in-memory adapter for loop and producer tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley_core::options::CompletionOptions;
use parley_core::tools::{ToolCallRecord, ToolDefinition};
use parley_core::usage::UsageStats;
use parley_llm::{
    BackendRequest, BackendResponse, CapabilityMatrix, ChunkState, FinishReason, NativeChunkStream,
    PayloadUnit, ProviderError, ProviderResult, StreamDelta, ToolCallDelta, VendorAdapter,
    should_declare_tools,
};
use parley_tools::{FnTool, StaticToolRegistry};
use serde_json::{Value, json};

/// Capability table: models ending in `-vision` see images; `legacy-*` has
/// no system role and no tools.
pub struct ScriptedCaps;

impl CapabilityMatrix for ScriptedCaps {
    fn accepts_system_role(&self, model: &str) -> bool {
        !model.starts_with("legacy-")
    }
    fn supports_tools(&self, model: &str) -> bool {
        !model.starts_with("legacy-")
    }
    fn supports_vision(&self, model: &str) -> bool {
        model.ends_with("-vision")
    }
    fn vision_fallbacks(&self) -> &[&'static str] {
        &["scripted-vision"]
    }
}

/// One scripted backend reply.
pub enum Reply {
    Complete(BackendResponse),
    Stream(Vec<ProviderResult<Value>>),
    Fail(ProviderError),
}

/// Adapter that replays [`Reply`]s in order and records every request.
#[derive(Default)]
pub struct ScriptedAdapter {
    replies: Mutex<VecDeque<Reply>>,
    pub requests: Mutex<Vec<BackendRequest>>,
}

impl ScriptedAdapter {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, request: &BackendRequest) -> ProviderResult<Reply> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::unexpected("script exhausted"))
    }
}

#[async_trait]
impl VendorAdapter for ScriptedAdapter {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn capabilities(&self) -> &dyn CapabilityMatrix {
        &ScriptedCaps
    }

    fn build_request(
        &self,
        model: &str,
        payload: &[PayloadUnit],
        tools: &[ToolDefinition],
        options: &CompletionOptions,
        stream: bool,
    ) -> ProviderResult<BackendRequest> {
        let units: Vec<Value> = payload
            .iter()
            .map(|u| {
                json!({
                    "role": u.role.as_str(),
                    "text": u.text(),
                    "toolCalls": u.tool_calls.len(),
                    "signature": u.reasoning.as_ref().map(|r| r.signature.as_str()),
                })
            })
            .collect();
        let declared: Vec<&str> = if should_declare_tools(&ScriptedCaps, model, options, tools) {
            tools.iter().map(|t| t.name.as_str()).collect()
        } else {
            Vec::new()
        };
        Ok(BackendRequest {
            model: model.to_string(),
            body: json!({"model": model, "units": units, "tools": declared}),
            stream,
        })
    }

    async fn complete(&self, request: &BackendRequest) -> ProviderResult<BackendResponse> {
        match self.next_reply(request)? {
            Reply::Complete(response) => Ok(response),
            Reply::Fail(err) => Err(err),
            Reply::Stream(_) => Err(ProviderError::unexpected("expected a complete reply")),
        }
    }

    async fn open_stream(&self, request: &BackendRequest) -> ProviderResult<NativeChunkStream> {
        match self.next_reply(request)? {
            Reply::Stream(chunks) => Ok(Box::pin(futures::stream::iter(chunks))),
            Reply::Fail(err) => Err(err),
            Reply::Complete(_) => Err(ProviderError::unexpected("expected a stream reply")),
        }
    }

    fn translate_chunk(&self, chunk: Value, _state: &mut ChunkState) -> ProviderResult<Vec<StreamDelta>> {
        Ok(vec![serde_json::from_value(chunk)?])
    }
}

// ── reply builders ──────────────────────────────────────────────────

pub fn text_reply(text: &str, usage: Option<UsageStats>) -> Reply {
    Reply::Complete(BackendResponse {
        text: text.into(),
        usage,
        ..BackendResponse::default()
    })
}

pub fn tool_reply(calls: &[(&str, &str, &str)], usage: Option<UsageStats>) -> Reply {
    Reply::Complete(BackendResponse {
        tool_calls: calls
            .iter()
            .map(|(id, name, args)| ToolCallRecord::new(*id, *name, *args))
            .collect(),
        usage,
        finish: FinishReason::ToolCalls,
        ..BackendResponse::default()
    })
}

pub fn chunk(delta: StreamDelta) -> ProviderResult<Value> {
    Ok(serde_json::to_value(delta).unwrap())
}

pub fn text_chunk(text: &str) -> ProviderResult<Value> {
    chunk(StreamDelta::text(text))
}

pub fn finish_chunk(reason: FinishReason, usage: Option<UsageStats>) -> ProviderResult<Value> {
    chunk(StreamDelta::finished(reason).with_usage(usage))
}

pub fn tool_chunk(id: Option<&str>, name: Option<&str>, args: &str) -> ProviderResult<Value> {
    chunk(StreamDelta::tool_call(ToolCallDelta {
        id: id.map(String::from),
        name: name.map(String::from),
        arguments: args.into(),
    }))
}

/// Registry with `get_weather(city)`.
pub fn weather_registry() -> Arc<StaticToolRegistry> {
    Arc::new(StaticToolRegistry::new().with(Arc::new(FnTool::new(
        ToolDefinition::new(
            "get_weather",
            "Current weather for a city",
            json!({"type": "object", "properties": {"city": {"type": "string"}}, "required": ["city"]}),
        ),
        |args| Ok(json!({"city": args["city"], "forecast": "sunny", "temp_c": 21})),
    ))))
}
