//! # Vendor Adapter
//!
//! One implementation per backend. An adapter:
//! - picks the effective model ([`select_model`](VendorAdapter::select_model))
//! - renders neutral [`PayloadUnit`]s into the backend's request body
//! - issues single-shot or streaming calls through its transport
//! - translates native responses and chunks back into neutral shapes
//!
//! Native chunks are normalized into [`StreamDelta`]s right here; nothing past
//! this boundary sees a backend-native shape. Per-stream translation state
//! lives in a [`ChunkState`] owned by the caller of
//! [`translate_chunk`](VendorAdapter::translate_chunk).

use std::collections::HashMap;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use parley_core::options::CompletionOptions;
use parley_core::thread::ConversationThread;
use parley_core::tools::{ToolCallRecord, ToolDefinition};
use parley_core::usage::UsageStats;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::capabilities::CapabilityMatrix;
use crate::error::ProviderResult;
use crate::payload::{PayloadUnit, build_payload};

/// Boxed stream of native chunks (one JSON value per SSE data line).
pub type NativeChunkStream = Pin<Box<dyn Stream<Item = ProviderResult<Value>> + Send>>;

// ─────────────────────────────────────────────────────────────────────────────
// Requests and responses
// ─────────────────────────────────────────────────────────────────────────────

/// A fully built backend request.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendRequest {
    /// Effective model.
    pub model: String,
    /// Native JSON body.
    pub body: Value,
    /// Whether the body asks for a streamed response.
    pub stream: bool,
}

/// Why the backend stopped generating.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of the answer.
    #[default]
    Stop,
    /// The model requested tool calls.
    ToolCalls,
    /// Output token cap reached.
    Length,
    /// Output filtered by the backend.
    ContentFilter,
    /// Any other backend-specific reason.
    Other(String),
}

/// Neutral result of a single-shot call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackendResponse {
    /// Visible text.
    pub text: String,
    /// Reasoning text, when exposed.
    pub reasoning: Option<String>,
    /// Signature over `reasoning`, for backends that verify replayed reasoning.
    pub reasoning_signature: Option<String>,
    /// Tool calls requested by the model, in backend order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Usage for this call.
    pub usage: Option<UsageStats>,
    /// Stop reason.
    pub finish: FinishReason,
}

// ─────────────────────────────────────────────────────────────────────────────
// Stream deltas
// ─────────────────────────────────────────────────────────────────────────────

/// A fragment of a tool call.
///
/// Backends differ on whether later fragments repeat the id; a fragment
/// without an id belongs to the most recently opened call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolCallDelta {
    /// Call id, when the backend sends one on this fragment.
    pub id: Option<String>,
    /// Function name, usually only on the first fragment.
    pub name: Option<String>,
    /// Argument JSON fragment.
    pub arguments: String,
}

/// One normalized step of a native stream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamDelta {
    /// Visible text fragment.
    pub content: Option<String>,
    /// Reasoning text fragment.
    pub reasoning: Option<String>,
    /// The reasoning block closed.
    pub reasoning_done: bool,
    /// Signature fragment for the current reasoning block.
    pub reasoning_signature: Option<String>,
    /// Tool-call fragments.
    pub tool_calls: Vec<ToolCallDelta>,
    /// Finish signal.
    pub finish: Option<FinishReason>,
    /// Usage reported with this step.
    pub usage: Option<UsageStats>,
}

impl StreamDelta {
    /// A visible text fragment.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Self::default()
        }
    }

    /// A reasoning fragment.
    #[must_use]
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self {
            reasoning: Some(text.into()),
            ..Self::default()
        }
    }

    /// End of the reasoning block.
    #[must_use]
    pub fn reasoning_end() -> Self {
        Self {
            reasoning_done: true,
            ..Self::default()
        }
    }

    /// A reasoning signature fragment.
    #[must_use]
    pub fn signature(signature: impl Into<String>) -> Self {
        Self {
            reasoning_signature: Some(signature.into()),
            ..Self::default()
        }
    }

    /// A single tool-call fragment.
    #[must_use]
    pub fn tool_call(delta: ToolCallDelta) -> Self {
        Self {
            tool_calls: vec![delta],
            ..Self::default()
        }
    }

    /// A finish signal.
    #[must_use]
    pub fn finished(reason: FinishReason) -> Self {
        Self {
            finish: Some(reason),
            ..Self::default()
        }
    }

    /// Attach usage.
    #[must_use]
    pub fn with_usage(mut self, usage: Option<UsageStats>) -> Self {
        self.usage = usage;
        self
    }

    /// Whether the delta carries nothing.
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.reasoning.is_none()
            && !self.reasoning_done
            && self.reasoning_signature.is_none()
            && self.tool_calls.is_empty()
            && self.finish.is_none()
            && self.usage.is_none()
    }
}

/// Kind of an open content block (for backends that index blocks).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// Visible text.
    Text,
    /// Reasoning / thinking.
    Reasoning,
    /// Tool call.
    ToolCall,
}

/// Per-stream translation state.
///
/// Covers usage reported before the finish signal and finish signals that
/// must wait for a trailing usage chunk.
#[derive(Debug, Default)]
pub struct ChunkState {
    /// Usage seen so far on this stream.
    pub usage: Option<UsageStats>,
    /// Finish signal held until usage arrives or the stream ends.
    pub pending_finish: Option<FinishReason>,
    /// Open content blocks by index.
    pub blocks: HashMap<u64, BlockKind>,
}

impl ChunkState {
    /// Create empty state for a new stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold a finish signal until [`take_finish`](Self::take_finish).
    pub fn hold_finish(&mut self, reason: FinishReason) {
        self.pending_finish = Some(reason);
    }

    /// Release a held finish signal together with any recorded usage.
    pub fn take_finish(&mut self) -> Option<StreamDelta> {
        let reason = self.pending_finish.take()?;
        Some(StreamDelta::finished(reason).with_usage(self.usage.take()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Adapter trait
// ─────────────────────────────────────────────────────────────────────────────

/// Backend adapter.
///
/// Implementors must be `Send + Sync` so one adapter can serve many turns.
#[async_trait]
pub trait VendorAdapter: Send + Sync {
    /// Backend identifier (e.g. `"openai"`).
    fn name(&self) -> &'static str;

    /// Capability table for this backend.
    fn capabilities(&self) -> &dyn CapabilityMatrix;

    /// Choose the effective model for a turn.
    ///
    /// If the thread has an image and `requested` lacks vision, the first
    /// vision-capable fallback is used. Deterministic and offline.
    fn select_model(
        &self,
        requested: &str,
        thread: &ConversationThread,
        _options: &CompletionOptions,
    ) -> String {
        let caps = self.capabilities();
        if !thread.has_image_attachment() || caps.supports_vision(requested) {
            return requested.to_string();
        }
        match caps
            .vision_fallbacks()
            .iter()
            .find(|m| caps.supports_vision(m))
        {
            Some(fallback) => {
                debug!(
                    backend = self.name(),
                    requested,
                    selected = fallback,
                    "substituting vision-capable model"
                );
                (*fallback).to_string()
            }
            None => {
                warn!(
                    backend = self.name(),
                    requested, "no vision-capable model available, keeping requested model"
                );
                requested.to_string()
            }
        }
    }

    /// Render the native request body.
    ///
    /// Tool declarations are included only when
    /// [`should_declare_tools`](crate::should_declare_tools) holds. Options the
    /// model does not support are omitted.
    fn build_request(
        &self,
        model: &str,
        payload: &[PayloadUnit],
        tools: &[ToolDefinition],
        options: &CompletionOptions,
        stream: bool,
    ) -> ProviderResult<BackendRequest>;

    /// Build the payload for `thread` and render the request in one step.
    fn prepare_request(
        &self,
        model: &str,
        thread: &ConversationThread,
        tools: &[ToolDefinition],
        options: &CompletionOptions,
        stream: bool,
    ) -> ProviderResult<BackendRequest> {
        let payload = build_payload(thread, model, self.capabilities());
        self.build_request(model, &payload, tools, options, stream)
    }

    /// Issue a single-shot call.
    async fn complete(&self, request: &BackendRequest) -> ProviderResult<BackendResponse>;

    /// Open a native chunk stream.
    async fn open_stream(&self, request: &BackendRequest) -> ProviderResult<NativeChunkStream>;

    /// Translate one native chunk.
    fn translate_chunk(
        &self,
        chunk: Value,
        state: &mut ChunkState,
    ) -> ProviderResult<Vec<StreamDelta>>;

    /// Flush anything held in `state` once the native stream has ended.
    fn finish_stream(&self, state: &mut ChunkState) -> Vec<StreamDelta> {
        state.take_finish().into_iter().collect()
    }
}

/// Merge `overrides` into the top level of `body`, replacing existing keys.
pub fn merge_overrides(body: &mut Value, overrides: &Map<String, Value>) {
    if let Value::Object(map) = body {
        for (key, value) in overrides {
            let _ = map.insert(key.clone(), value.clone());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
