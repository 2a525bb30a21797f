//! `OpenAI` Chat Completions wire types.
//!
//! Request types serialize to the exact JSON the API expects; response and
//! chunk types deserialize leniently (unknown fields ignored, most fields
//! optional).

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// Chat Completions request body.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ChatRequest {
    /// Model ID.
    pub model: String,
    /// Conversation.
    pub messages: Vec<ChatMessage>,
    /// Output cap for chat models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Output cap for reasoning models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Reasoning effort (`low` / `medium` / `high`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
    /// Declared tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ChatTool>>,
    /// Streaming mode.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    /// Streaming options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

/// `stream_options` object.
#[derive(Clone, Debug, Serialize)]
pub struct StreamOptions {
    /// Send a trailing usage chunk.
    pub include_usage: bool,
}

/// One message in the request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatMessage {
    /// `system`, `user`, `assistant` or `tool`.
    pub role: String,
    /// String, array of content parts, or absent for tool-call-only turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Tool calls announced by an assistant message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChatToolCall>>,
    /// Call answered by a tool message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Function tool declaration.
#[derive(Clone, Debug, Serialize)]
pub struct ChatTool {
    /// Always `"function"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Function signature.
    pub function: ChatFunctionDef,
}

/// Function signature in a tool declaration.
#[derive(Clone, Debug, Serialize)]
pub struct ChatFunctionDef {
    /// Function name.
    pub name: String,
    /// Description.
    pub description: String,
    /// JSON Schema for the arguments.
    pub parameters: Value,
}

/// Tool call, as sent in requests and returned in complete responses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatToolCall {
    /// Call ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Always `"function"`.
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    /// Function name and serialized arguments.
    pub function: ChatFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

/// Function name and arguments of a tool call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatFunctionCall {
    /// Function name.
    pub name: String,
    /// Serialized JSON arguments.
    #[serde(default)]
    pub arguments: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

/// Non-streaming response.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatCompletion {
    /// Choices (only the first is used).
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage.
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

/// One choice of a complete response.
#[derive(Clone, Debug, Deserialize)]
pub struct Choice {
    /// Assistant message.
    pub message: ResponseMessage,
    /// Finish reason.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant message of a complete response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResponseMessage {
    /// Text content.
    #[serde(default)]
    pub content: Option<String>,
    /// Reasoning text (compatible servers only).
    #[serde(default)]
    pub reasoning_content: Option<String>,
    /// Tool calls.
    #[serde(default)]
    pub tool_calls: Option<Vec<ChatToolCall>>,
}

/// Token usage.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OpenAiUsage {
    /// Input tokens.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Output tokens.
    #[serde(default)]
    pub completion_tokens: u64,
    /// Input breakdown.
    #[serde(default)]
    pub prompt_tokens_details: Option<PromptTokensDetails>,
    /// Output breakdown.
    #[serde(default)]
    pub completion_tokens_details: Option<CompletionTokensDetails>,
}

/// Input token breakdown.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PromptTokensDetails {
    /// Cached input tokens.
    #[serde(default)]
    pub cached_tokens: u64,
    /// Audio input tokens.
    #[serde(default)]
    pub audio_tokens: u64,
}

/// Output token breakdown.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CompletionTokensDetails {
    /// Hidden reasoning tokens.
    #[serde(default)]
    pub reasoning_tokens: u64,
    /// Audio output tokens.
    #[serde(default)]
    pub audio_tokens: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Streaming chunks
// ─────────────────────────────────────────────────────────────────────────────

/// One `chat.completion.chunk`.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatCompletionChunk {
    /// Choices (empty on the trailing usage chunk).
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// Usage (trailing chunk only).
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

/// One choice of a chunk.
#[derive(Clone, Debug, Deserialize)]
pub struct ChunkChoice {
    /// Incremental content.
    #[serde(default)]
    pub delta: ChunkDelta,
    /// Set on the last content chunk.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Incremental content of a chunk.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChunkDelta {
    /// Text fragment.
    #[serde(default)]
    pub content: Option<String>,
    /// Reasoning fragment (compatible servers only).
    #[serde(default)]
    pub reasoning_content: Option<String>,
    /// Tool-call fragments.
    #[serde(default)]
    pub tool_calls: Option<Vec<ChunkToolCall>>,
}

/// Tool-call fragment. Only the first fragment of a call carries `id`.
#[derive(Clone, Debug, Deserialize)]
pub struct ChunkToolCall {
    /// Position of the call in the response.
    #[serde(default)]
    pub index: u32,
    /// Call ID (first fragment).
    #[serde(default)]
    pub id: Option<String>,
    /// Name and argument fragment.
    #[serde(default)]
    pub function: Option<ChunkFunction>,
}

/// Function part of a tool-call fragment.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChunkFunction {
    /// Function name (first fragment).
    #[serde(default)]
    pub name: Option<String>,
    /// Argument fragment.
    #[serde(default)]
    pub arguments: Option<String>,
}
