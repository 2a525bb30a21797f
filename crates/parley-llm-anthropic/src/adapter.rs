//! # Anthropic Adapter
//!
//! [`VendorAdapter`] for the Messages endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use parley_core::options::CompletionOptions;
use parley_core::tools::{ToolCallRecord, ToolDefinition};
use parley_llm::{
    BackendRequest, BackendResponse, BackendTransport, CapabilityMatrix, ChunkState, FinishReason,
    HttpTransport, HttpTransportConfig, NativeChunkStream, PayloadUnit, ProviderResult,
    StreamDelta, VendorAdapter, merge_overrides, should_declare_tools,
};
use serde_json::Value;
use tracing::debug;

use crate::capabilities::{AnthropicCapabilities, thinking_budget};
use crate::message_converter::{convert_payload, convert_tools};
use crate::stream_handler::{convert_usage, map_stop_reason, translate_event};
use crate::types::{DEFAULT_MAX_TOKENS, MessagesRequest, MessagesResponse, ResponseBlock, ThinkingConfig};

/// Request path, relative to the API root.
pub const MESSAGES_PATH: &str = "messages";

/// Anthropic Messages adapter.
pub struct AnthropicAdapter {
    transport: Arc<dyn BackendTransport>,
    capabilities: Arc<dyn CapabilityMatrix>,
}

impl AnthropicAdapter {
    /// Create an adapter over any transport.
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self {
            transport,
            capabilities: Arc::new(AnthropicCapabilities),
        }
    }

    /// Replace the Claude capability table.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Arc<dyn CapabilityMatrix>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Create an adapter with an HTTP transport, `x-api-key` auth and the
    /// given `anthropic-version` header.
    pub fn with_api_key(base_url: &str, api_key: &str, api_version: &str) -> ProviderResult<Self> {
        let config = HttpTransportConfig::new(base_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", api_version);
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }
}

#[async_trait]
impl VendorAdapter for AnthropicAdapter {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn capabilities(&self) -> &dyn CapabilityMatrix {
        self.capabilities.as_ref()
    }

    fn build_request(
        &self,
        model: &str,
        payload: &[PayloadUnit],
        tools: &[ToolDefinition],
        options: &CompletionOptions,
        stream: bool,
    ) -> ProviderResult<BackendRequest> {
        let caps = self.capabilities.as_ref();
        let mut omitted: Vec<&str> = Vec::new();
        let converted = convert_payload(payload);

        let thinking = match options.reasoning_effort {
            Some(effort) if caps.supports_reasoning_effort(model) => {
                Some(ThinkingConfig::enabled(thinking_budget(effort)))
            }
            Some(_) => {
                omitted.push("reasoning_effort");
                None
            }
            None => None,
        };

        // The endpoint requires an output cap, so an unsupported one falls
        // back to the default rather than being dropped.
        let requested_max = match options.max_tokens {
            Some(_) if !caps.supports_max_tokens(model) => {
                omitted.push("max_tokens");
                None
            }
            max => max,
        };
        let mut max_tokens = requested_max.unwrap_or(DEFAULT_MAX_TOKENS);
        if let Some(config) = &thinking {
            // The output cap must exceed the thinking budget.
            if max_tokens <= config.budget_tokens {
                max_tokens = config.budget_tokens.saturating_add(DEFAULT_MAX_TOKENS);
            }
        }

        let mut request = MessagesRequest {
            model: model.to_string(),
            max_tokens,
            messages: converted.messages,
            system: converted.system,
            stream,
            ..MessagesRequest::default()
        };

        // Sampling options are rejected alongside extended thinking.
        let sampling = thinking.is_none();
        if options.temperature.is_some() {
            if sampling && caps.supports_temperature(model) {
                request.temperature = options.temperature;
            } else {
                omitted.push("temperature");
            }
        }
        if options.top_p.is_some() {
            if sampling && caps.supports_top_p(model) {
                request.top_p = options.top_p;
            } else {
                omitted.push("top_p");
            }
        }
        if options.top_k.is_some() {
            if sampling && caps.supports_top_k(model) {
                request.top_k = options.top_k;
            } else {
                omitted.push("top_k");
            }
        }
        request.thinking = thinking;

        if should_declare_tools(caps, model, options, tools) {
            request.tools = Some(convert_tools(tools));
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
        let value = self.transport.send(MESSAGES_PATH, &request.body).await?;
        let response: MessagesResponse = serde_json::from_value(value)?;

        let mut text = String::new();
        let mut reasoning: Option<String> = None;
        let mut reasoning_signature: Option<String> = None;
        let mut tool_calls = Vec::new();
        for block in response.content {
            match block {
                ResponseBlock::Text { text: t } => text.push_str(&t),
                ResponseBlock::Thinking { thinking, signature } => {
                    reasoning.get_or_insert_with(String::new).push_str(&thinking);
                    if signature.is_some() {
                        reasoning_signature = signature;
                    }
                }
                ResponseBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCallRecord::new(id, name, input.to_string()));
                }
                ResponseBlock::Other => {}
            }
        }

        let finish = response.stop_reason.as_deref().map_or(FinishReason::Stop, map_stop_reason);

        Ok(BackendResponse {
            text,
            reasoning,
            reasoning_signature,
            tool_calls,
            usage: response.usage.as_ref().map(convert_usage),
            finish,
        })
    }

    async fn open_stream(&self, request: &BackendRequest) -> ProviderResult<NativeChunkStream> {
        debug!(model = %request.model, "opening Anthropic stream");
        self.transport.stream(MESSAGES_PATH, &request.body).await
    }

    fn translate_chunk(
        &self,
        chunk: Value,
        state: &mut ChunkState,
    ) -> ProviderResult<Vec<StreamDelta>> {
        translate_event(chunk, state)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
