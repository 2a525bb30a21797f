//! Caller-facing completion API.

use std::borrow::Cow;
use std::sync::Arc;

use parley_core::options::CompletionOptions;
use parley_core::thread::ConversationThread;
use parley_core::tools::ToolCallRecord;
use parley_core::usage::UsageStats;
use parley_llm::VendorAdapter;
use parley_settings::{BackendKind, ParleySettings};
use parley_tools::ToolRegistry;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::context::StreamingContext;
use crate::errors::RuntimeError;
use crate::factory::build_adapter;
use crate::stream_producer::{ChunkEventStream, produce_stream};
use crate::tool_executor::ToolEventSink;
use crate::tool_loop::run_tool_loop;

/// Hop limit used when none is configured.
pub const DEFAULT_MAX_TOOL_HOPS: u32 = 16;

/// Aggregate result of a single-shot turn.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    /// Final visible text.
    pub text: String,
    /// Final reasoning text, when the backend exposed it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Every tool call executed during the turn, with results.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Usage summed over every hop (only when tracking was requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageStats>,
    /// Effective model.
    pub model: String,
    /// Tool round trips taken.
    pub hops: u32,
    /// The caller's thread plus every tool round trip.
    pub thread: ConversationThread,
}

/// Runs turns against one backend with one tool registry.
///
/// Cheap to clone; every turn owns its own state.
#[derive(Clone)]
pub struct Completer {
    adapter: Arc<dyn VendorAdapter>,
    registry: Arc<dyn ToolRegistry>,
    max_tool_hops: u32,
    track_usage: bool,
    default_model: Option<String>,
}

impl std::fmt::Debug for Completer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("backend", &self.adapter.name())
            .field("max_tool_hops", &self.max_tool_hops)
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}

impl Completer {
    /// Create a completer with the default hop limit.
    pub fn new(adapter: Arc<dyn VendorAdapter>, registry: Arc<dyn ToolRegistry>) -> Self {
        Self {
            adapter,
            registry,
            max_tool_hops: DEFAULT_MAX_TOOL_HOPS,
            track_usage: false,
            default_model: None,
        }
    }

    /// Build a completer for `kind` from settings.
    ///
    /// The API key is read from the backend's `apiKeyEnv` variable. With
    /// `runtime.trackUsage` on, every turn reports usage whatever options the
    /// caller passes.
    pub fn from_settings(
        settings: &ParleySettings,
        kind: BackendKind,
        registry: Arc<dyn ToolRegistry>,
    ) -> Result<Self, RuntimeError> {
        let adapter = build_adapter(settings, kind)?;
        Ok(Self::new(adapter, registry)
            .with_max_tool_hops(settings.runtime.max_tool_hops)
            .with_track_usage(settings.runtime.track_usage)
            .with_default_model(settings.backend(kind).default_model.clone()))
    }

    /// Override the hop limit.
    #[must_use]
    pub fn with_max_tool_hops(mut self, max_tool_hops: u32) -> Self {
        self.max_tool_hops = max_tool_hops;
        self
    }

    /// Track usage on every turn, in addition to callers that ask for it.
    #[must_use]
    pub fn with_track_usage(mut self, track_usage: bool) -> Self {
        self.track_usage = track_usage;
        self
    }

    /// Model used when a caller passes an empty model name.
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Options carrying the configured defaults.
    pub fn default_options(&self) -> CompletionOptions {
        CompletionOptions::new().track_usage(self.track_usage)
    }

    /// Backend identifier.
    pub fn backend(&self) -> &'static str {
        self.adapter.name()
    }

    fn effective_options<'a>(&self, options: &'a CompletionOptions) -> Cow<'a, CompletionOptions> {
        if self.track_usage && !options.track_usage {
            Cow::Owned(options.clone().track_usage(true))
        } else {
            Cow::Borrowed(options)
        }
    }

    fn effective_model(&self, model: &str, thread: &ConversationThread, options: &CompletionOptions) -> String {
        let requested = match &self.default_model {
            Some(default) if model.is_empty() => default.as_str(),
            _ => model,
        };
        self.adapter.select_model(requested, thread, options)
    }

    /// Run a turn to completion, executing tools as the model requests them.
    ///
    /// `thread` is not modified; the extended thread is returned in the
    /// result.
    pub async fn complete(
        &self,
        model: &str,
        thread: &ConversationThread,
        options: &CompletionOptions,
    ) -> Result<CompletionResult, RuntimeError> {
        self.run(model, thread, options, None).await
    }

    /// [`complete`](Self::complete), reporting tool progress to `events` as
    /// `toolStatus` and `toolResult` events in call order.
    pub async fn complete_with_events(
        &self,
        model: &str,
        thread: &ConversationThread,
        options: &CompletionOptions,
        events: &ToolEventSink,
    ) -> Result<CompletionResult, RuntimeError> {
        self.run(model, thread, options, Some(events)).await
    }

    #[instrument(skip_all, fields(backend = self.adapter.name(), model = %model))]
    async fn run(
        &self,
        model: &str,
        thread: &ConversationThread,
        options: &CompletionOptions,
        events: Option<&ToolEventSink>,
    ) -> Result<CompletionResult, RuntimeError> {
        let options = self.effective_options(options);
        let model = self.effective_model(model, thread, &options);
        run_tool_loop(
            self.adapter.as_ref(),
            self.registry.as_ref(),
            &model,
            thread,
            &options,
            self.max_tool_hops,
            events,
        )
        .await
    }

    /// Stream a turn as [`ChunkEvent`](parley_core::ChunkEvent)s.
    pub fn stream(
        &self,
        model: &str,
        thread: &ConversationThread,
        options: &CompletionOptions,
    ) -> ChunkEventStream {
        self.stream_with_cancel(model, thread, options, CancellationToken::new())
    }

    /// Stream a turn that stops with [`RuntimeError::Cancelled`] once
    /// `cancel` fires.
    pub fn stream_with_cancel(
        &self,
        model: &str,
        thread: &ConversationThread,
        options: &CompletionOptions,
        cancel: CancellationToken,
    ) -> ChunkEventStream {
        let options = self.effective_options(options).into_owned();
        let model = self.effective_model(model, thread, &options);
        let ctx = StreamingContext::new(model, thread.clone(), options);
        produce_stream(
            Arc::clone(&self.adapter),
            Arc::clone(&self.registry),
            ctx,
            self.max_tool_hops,
            cancel,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
