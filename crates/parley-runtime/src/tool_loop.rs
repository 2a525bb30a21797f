//! # Tool Execution Loop
//!
//! Single-shot turn driver:
//!
//! ```text
//! Requesting → Responded → ToolsPending → Requesting → … → Terminal
//! ```
//!
//! Each pass issues one backend call with the current thread. A response
//! carrying tool calls has them executed in order, folded into the thread,
//! and the request re-issued. A response without tool calls ends the turn.
//!
//! An optional [`ToolEventSink`] receives the same tool progress events the
//! stream producer yields.

use parley_core::messages::ReasoningBlock;
use parley_core::options::CompletionOptions;
use parley_core::thread::ConversationThread;
use parley_core::tools::{ToolCallRecord, ToolDefinition};
use parley_core::usage::UsageStats;
use parley_llm::{BackendResponse, VendorAdapter};
use parley_tools::ToolRegistry;
use tracing::{debug, info, instrument};

use crate::client::CompletionResult;
use crate::errors::RuntimeError;
use crate::tool_executor::{ToolEventSink, execute_calls, fold_into_thread};

/// Loop state.
#[derive(Debug)]
pub enum LoopState {
    /// About to issue a backend call.
    Requesting,
    /// A response arrived and has not been inspected.
    Responded(BackendResponse),
    /// Tool calls must run before the next request.
    ToolsPending {
        /// Assistant text that accompanied the calls.
        text: String,
        /// Signed reasoning to replay with the calls.
        reasoning: Option<ReasoningBlock>,
        /// Calls in backend order.
        calls: Vec<ToolCallRecord>,
    },
    /// Final response with no tool calls.
    Terminal(BackendResponse),
}

/// Add a hop's usage into the running total.
///
/// Nothing is recorded unless tracking is on and the hop reported usage.
pub fn accumulate_usage(total: &mut Option<UsageStats>, hop: Option<&UsageStats>, track: bool) {
    if !track {
        return;
    }
    if let Some(hop) = hop {
        total.get_or_insert_with(UsageStats::default).accumulate(hop);
    }
}

/// Run a single-shot turn to completion.
#[instrument(skip_all, fields(backend = adapter.name(), model = %model, max_hops = max_hops))]
pub async fn run_tool_loop(
    adapter: &dyn VendorAdapter,
    registry: &dyn ToolRegistry,
    model: &str,
    thread: &ConversationThread,
    options: &CompletionOptions,
    max_hops: u32,
    sink: Option<&ToolEventSink>,
) -> Result<CompletionResult, RuntimeError> {
    let tools: Vec<ToolDefinition> = registry.list();
    let mut thread = thread.clone();
    let mut executed: Vec<ToolCallRecord> = Vec::new();
    let mut usage: Option<UsageStats> = None;
    let mut hop: u32 = 0;
    let mut state = LoopState::Requesting;

    loop {
        state = match state {
            LoopState::Requesting => {
                let request = adapter.prepare_request(model, &thread, &tools, options, false)?;
                debug!(hop, messages = thread.len(), "issuing backend call");
                LoopState::Responded(adapter.complete(&request).await?)
            }

            LoopState::Responded(response) => {
                accumulate_usage(&mut usage, response.usage.as_ref(), options.track_usage);
                if response.tool_calls.is_empty() {
                    LoopState::Terminal(response)
                } else {
                    if hop >= max_hops {
                        return Err(RuntimeError::ToolLoopExceeded { limit: max_hops });
                    }
                    hop += 1;
                    debug!(hop, calls = response.tool_calls.len(), "tool calls requested");
                    let reasoning = ReasoningBlock::signed(
                        response.reasoning.unwrap_or_default(),
                        response.reasoning_signature,
                    );
                    LoopState::ToolsPending {
                        text: response.text,
                        reasoning,
                        calls: response.tool_calls,
                    }
                }
            }

            LoopState::ToolsPending { text, reasoning, calls } => {
                let done = execute_calls(registry, calls, sink).await?;
                fold_into_thread(&mut thread, &text, reasoning, &done);
                executed.extend(done);
                LoopState::Requesting
            }

            LoopState::Terminal(response) => {
                info!(hops = hop, tool_calls = executed.len(), "turn complete");
                return Ok(CompletionResult {
                    text: response.text,
                    reasoning: response.reasoning,
                    tool_calls: executed,
                    usage,
                    model: model.to_string(),
                    hops: hop,
                    thread,
                });
            }
        };
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
