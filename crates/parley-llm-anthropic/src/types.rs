//! Messages API wire types.
//!
//! Request bodies are built from these structs; responses and SSE events are
//! deserialized into them and never leave this crate.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Output cap sent when the caller sets none.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /messages` body.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MessagesRequest {
    /// Model ID.
    pub model: String,
    /// Output cap (required by the API).
    pub max_tokens: u32,
    /// Conversation, alternating user / assistant.
    pub messages: Vec<MessageParam>,
    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Extended thinking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingConfig>,
    /// Tool declarations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<AnthropicTool>>,
    /// Stream mode.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

/// Extended-thinking configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ThinkingConfig {
    /// Always `"enabled"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Token budget for thinking.
    pub budget_tokens: u32,
}

impl ThinkingConfig {
    /// Thinking with the given budget.
    pub fn enabled(budget_tokens: u32) -> Self {
        Self {
            kind: "enabled",
            budget_tokens,
        }
    }
}

/// Tool declaration.
#[derive(Clone, Debug, Serialize)]
pub struct AnthropicTool {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for the input object.
    pub input_schema: Value,
}

/// A message in request format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageParam {
    /// `"user"` or `"assistant"`.
    pub role: String,
    /// Content blocks.
    pub content: Vec<Value>,
}

/// Text content block.
pub fn text_block(text: &str) -> Value {
    json!({"type": "text", "text": text})
}

/// Base64 image content block.
pub fn image_block(data: &str, media_type: &str) -> Value {
    json!({
        "type": "image",
        "source": {"type": "base64", "media_type": media_type, "data": data},
    })
}

/// Signed thinking block (assistant side, replayed verbatim).
pub fn thinking_block(thinking: &str, signature: &str) -> Value {
    json!({"type": "thinking", "thinking": thinking, "signature": signature})
}

/// Tool invocation block (assistant side).
pub fn tool_use_block(id: &str, name: &str, input: Value) -> Value {
    json!({"type": "tool_use", "id": id, "name": name, "input": input})
}

/// Tool result block (user side).
pub fn tool_result_block(tool_use_id: &str, content: &str) -> Value {
    json!({"type": "tool_result", "tool_use_id": tool_use_id, "content": content})
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

/// Non-streaming response body.
#[derive(Clone, Debug, Deserialize)]
pub struct MessagesResponse {
    /// Content blocks in order.
    #[serde(default)]
    pub content: Vec<ResponseBlock>,
    /// Why generation stopped.
    pub stop_reason: Option<String>,
    /// Token usage.
    pub usage: Option<AnthropicUsage>,
}

/// Content block of a non-streaming response.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    /// Visible text.
    Text {
        /// Text.
        text: String,
    },
    /// Extended thinking.
    Thinking {
        /// Thinking text.
        thinking: String,
        /// Signature the API verifies when the block is replayed.
        #[serde(default)]
        signature: Option<String>,
    },
    /// Tool invocation.
    ToolUse {
        /// Call ID.
        id: String,
        /// Tool name.
        name: String,
        /// Arguments object.
        #[serde(default)]
        input: Value,
    },
    /// Redacted thinking and future block types.
    #[serde(other)]
    Other,
}

/// Token usage.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AnthropicUsage {
    /// Input tokens.
    #[serde(default)]
    pub input_tokens: u64,
    /// Output tokens.
    #[serde(default)]
    pub output_tokens: u64,
    /// Prompt tokens served from cache.
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// SSE events
// ─────────────────────────────────────────────────────────────────────────────

/// Streaming event, discriminated by `type`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseEvent {
    /// First event; carries input usage.
    MessageStart {
        /// Message envelope.
        message: SseMessage,
    },
    /// A content block opens.
    ContentBlockStart {
        /// Block index.
        index: u64,
        /// Opening block.
        content_block: SseContentBlock,
    },
    /// Incremental block content.
    ContentBlockDelta {
        /// Block index.
        index: u64,
        /// Fragment.
        delta: SseDelta,
    },
    /// A content block closes.
    ContentBlockStop {
        /// Block index.
        index: u64,
    },
    /// Stop reason and output usage.
    MessageDelta {
        /// Message-level fields.
        delta: SseMessageDelta,
        /// Output usage so far.
        #[serde(default)]
        usage: Option<SseUsageDelta>,
    },
    /// End of message.
    MessageStop,
    /// Keepalive.
    Ping,
    /// In-band API error.
    Error {
        /// Error details.
        error: SseError,
    },
    /// Event types this adapter does not know.
    #[serde(other)]
    Unknown,
}

/// Envelope in `message_start`.
#[derive(Clone, Debug, Deserialize)]
pub struct SseMessage {
    /// Usage at message start.
    #[serde(default)]
    pub usage: AnthropicUsage,
}

/// Opening block in `content_block_start`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseContentBlock {
    /// Text block.
    Text {
        /// Initial text (usually empty).
        #[serde(default)]
        text: String,
    },
    /// Thinking block.
    Thinking {
        /// Initial thinking (usually empty).
        #[serde(default)]
        thinking: String,
        /// Initial signature (usually empty; sent later as `signature_delta`).
        #[serde(default)]
        signature: String,
    },
    /// Tool use block.
    ToolUse {
        /// Call ID.
        id: String,
        /// Tool name.
        name: String,
    },
    /// Redacted thinking and future block types.
    #[serde(other)]
    Other,
}

/// Fragment in `content_block_delta`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseDelta {
    /// Text fragment.
    TextDelta {
        /// Text.
        text: String,
    },
    /// Thinking fragment.
    ThinkingDelta {
        /// Thinking text.
        thinking: String,
    },
    /// Thinking signature fragment.
    SignatureDelta {
        /// Signature.
        signature: String,
    },
    /// Tool input fragment.
    InputJsonDelta {
        /// Partial JSON.
        partial_json: String,
    },
    /// Future delta types.
    #[serde(other)]
    Other,
}

/// Message-level fields in `message_delta`.
#[derive(Clone, Debug, Deserialize)]
pub struct SseMessageDelta {
    /// Stop reason.
    pub stop_reason: Option<String>,
}

/// Usage in `message_delta`.
#[derive(Clone, Debug, Deserialize)]
pub struct SseUsageDelta {
    /// Output tokens so far (cumulative).
    #[serde(default)]
    pub output_tokens: u64,
}

/// Error payload of an `error` event.
#[derive(Clone, Debug, Deserialize)]
pub struct SseError {
    /// Error type (e.g. `overloaded_error`).
    #[serde(rename = "type")]
    pub error_type: String,
    /// Human-readable message.
    pub message: String,
}
