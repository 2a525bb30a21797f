//! # `OpenAI` Adapter
//!
//! [`VendorAdapter`] for the Chat Completions endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use parley_core::ids::new_tool_call_id;
use parley_core::options::CompletionOptions;
use parley_core::tools::{ToolCallRecord, ToolDefinition};
use parley_llm::adapter::merge_overrides;
use parley_llm::{
    BackendRequest, BackendResponse, BackendTransport, CapabilityMatrix, ChunkState, FinishReason,
    HttpTransport, HttpTransportConfig, NativeChunkStream, PayloadUnit, ProviderError,
    ProviderResult, StreamDelta, VendorAdapter, should_declare_tools,
};
use serde_json::Value;
use tracing::debug;

use crate::capabilities::{OpenAiCapabilities, is_reasoning_model};
use crate::message_converter::{convert_payload, convert_tools};
use crate::stream_handler::{convert_usage, map_finish_reason, translate_chunk};
use crate::types::{ChatCompletion, ChatRequest, StreamOptions};

/// Request path, relative to the API root.
pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// `OpenAI` Chat Completions adapter.
pub struct OpenAiAdapter {
    transport: Arc<dyn BackendTransport>,
    capabilities: OpenAiCapabilities,
}

impl OpenAiAdapter {
    /// Create an adapter over any transport.
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self {
            transport,
            capabilities: OpenAiCapabilities,
        }
    }

    /// Create an adapter with an HTTP transport and bearer-token auth.
    pub fn with_api_key(base_url: &str, api_key: &str) -> ProviderResult<Self> {
        let config = HttpTransportConfig::new(base_url)
            .header("authorization", format!("Bearer {api_key}"));
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }
}

#[async_trait]
impl VendorAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn capabilities(&self) -> &dyn CapabilityMatrix {
        &self.capabilities
    }

    fn build_request(
        &self,
        model: &str,
        payload: &[PayloadUnit],
        tools: &[ToolDefinition],
        options: &CompletionOptions,
        stream: bool,
    ) -> ProviderResult<BackendRequest> {
        let caps = &self.capabilities;
        let mut omitted: Vec<&str> = Vec::new();
        let mut request = ChatRequest {
            model: model.to_string(),
            messages: convert_payload(payload),
            stream,
            ..ChatRequest::default()
        };

        if let Some(max) = options.max_tokens {
            if is_reasoning_model(model) {
                request.max_completion_tokens = Some(max);
            } else {
                request.max_tokens = Some(max);
            }
        }
        if options.temperature.is_some() {
            if caps.supports_temperature(model) {
                request.temperature = options.temperature;
            } else {
                omitted.push("temperature");
            }
        }
        if options.top_p.is_some() {
            if caps.supports_top_p(model) {
                request.top_p = options.top_p;
            } else {
                omitted.push("top_p");
            }
        }
        if options.top_k.is_some() {
            omitted.push("top_k");
        }
        if let Some(effort) = options.reasoning_effort {
            if caps.supports_reasoning_effort(model) {
                request.reasoning_effort = Some(effort.as_str().to_string());
            } else {
                omitted.push("reasoning_effort");
            }
        }
        if should_declare_tools(caps, model, options, tools) {
            request.tools = Some(convert_tools(tools));
        }
        if stream && options.track_usage {
            request.stream_options = Some(StreamOptions {
                include_usage: true,
            });
        }

        if !omitted.is_empty() {
            debug!(model, ?omitted, "omitting options unsupported by model");
        }

        let mut body = serde_json::to_value(&request)?;
        merge_overrides(&mut body, &options.custom_overrides);
        Ok(BackendRequest {
            model: model.to_string(),
            body,
            stream,
        })
    }

    async fn complete(&self, request: &BackendRequest) -> ProviderResult<BackendResponse> {
        let value = self.transport.send(CHAT_COMPLETIONS_PATH, &request.body).await?;
        let completion: ChatCompletion = serde_json::from_value(value)?;
        let usage = completion.usage.as_ref().map(convert_usage);
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::unexpected("response has no choices"))?;

        let tool_calls: Vec<ToolCallRecord> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                ToolCallRecord::new(
                    call.id.unwrap_or_else(new_tool_call_id),
                    call.function.name,
                    call.function.arguments,
                )
            })
            .collect();

        let finish = choice.finish_reason.as_deref().map_or_else(
            || {
                if tool_calls.is_empty() {
                    FinishReason::Stop
                } else {
                    FinishReason::ToolCalls
                }
            },
            map_finish_reason,
        );

        Ok(BackendResponse {
            text: choice.message.content.unwrap_or_default(),
            reasoning: choice.message.reasoning_content,
            reasoning_signature: None,
            tool_calls,
            usage,
            finish,
        })
    }

    async fn open_stream(&self, request: &BackendRequest) -> ProviderResult<NativeChunkStream> {
        debug!(model = %request.model, "opening OpenAI stream");
        self.transport.stream(CHAT_COMPLETIONS_PATH, &request.body).await
    }

    fn translate_chunk(
        &self,
        chunk: Value,
        state: &mut ChunkState,
    ) -> ProviderResult<Vec<StreamDelta>> {
        translate_chunk(chunk, state)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
