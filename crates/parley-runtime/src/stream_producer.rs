//! # Stream Producer
//!
//! Turns a streaming turn into one [`ChunkEventStream`].
//!
//! Each hop opens a native backend stream, translates its chunks through the
//! adapter, and yields [`ChunkEvent`]s. When a hop finishes with tool calls,
//! the calls run in order, the round trip is folded into the working thread,
//! and a fresh native stream is opened behind a `streamSwitch` event. The
//! caller keeps polling the same producer throughout.
//!
//! A hop that finishes without tool calls ends the turn with exactly one
//! `content { done: true }`, followed by the cumulative `usage` when tracking
//! is on and the backend reported any.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use parley_core::events::{ChunkEvent, ToolPhase};
use parley_core::messages::ReasoningBlock;
use parley_core::usage::UsageStats;
use parley_llm::{ChunkState, FinishReason, VendorAdapter};
use parley_tools::ToolRegistry;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::context::StreamingContext;
use crate::errors::RuntimeError;
use crate::tool_executor::{fold_into_thread, invoke_call, parse_call_arguments};
use crate::tool_loop::accumulate_usage;

/// Boxed event stream for one streaming turn.
pub type ChunkEventStream = Pin<Box<dyn Stream<Item = Result<ChunkEvent, RuntimeError>> + Send>>;

/// Start producing events for `ctx`.
///
/// Nothing is sent to the backend until the stream is first polled.
pub fn produce_stream(
    adapter: Arc<dyn VendorAdapter>,
    registry: Arc<dyn ToolRegistry>,
    ctx: StreamingContext,
    max_hops: u32,
    cancel: CancellationToken,
) -> ChunkEventStream {
    Box::pin(events(adapter, registry, ctx, max_hops, cancel))
}

fn ensure_live(cancel: &CancellationToken) -> Result<(), RuntimeError> {
    if cancel.is_cancelled() {
        Err(RuntimeError::Cancelled)
    } else {
        Ok(())
    }
}

#[allow(clippy::too_many_lines)]
fn events(
    adapter: Arc<dyn VendorAdapter>,
    registry: Arc<dyn ToolRegistry>,
    mut ctx: StreamingContext,
    max_hops: u32,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<ChunkEvent, RuntimeError>> + Send {
    async_stream::try_stream! {
        let tools = registry.list();
        let track = ctx.options.track_usage;
        let mut total: Option<UsageStats> = None;
        let mut hop: u32 = 0;

        loop {
            ensure_live(&cancel)?;
            let request = adapter.prepare_request(&ctx.model, &ctx.thread, &tools, &ctx.options, true)?;
            debug!(backend = adapter.name(), model = %ctx.model, hop, "opening backend stream");
            let opened = tokio::select! {
                biased;
                () = cancel.cancelled() => Err(RuntimeError::Cancelled),
                opened = adapter.open_stream(&request) => opened.map_err(RuntimeError::from),
            };
            let mut native = opened?;
            ctx.begin_attempt(request);

            if hop > 0 {
                yield ChunkEvent::StreamSwitch { hop, model: ctx.model.clone() };
            }

            let mut state = ChunkState::new();
            let mut hop_text = String::new();
            let mut hop_reasoning = String::new();
            let mut hop_signature = String::new();
            let mut final_text = String::new();
            let mut hop_usage: Option<UsageStats> = None;
            let mut finish: Option<FinishReason> = None;
            let mut reasoning_open = false;
            let mut ended = false;

            while !ended {
                let next = tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(RuntimeError::Cancelled),
                    chunk = native.next() => Ok(chunk),
                };
                let deltas = match next? {
                    Some(chunk) => adapter.translate_chunk(chunk?, &mut state)?,
                    None => {
                        ended = true;
                        adapter.finish_stream(&mut state)
                    }
                };

                for delta in deltas {
                    if let Some(text) = delta.reasoning.filter(|t| !t.is_empty()) {
                        reasoning_open = true;
                        hop_reasoning.push_str(&text);
                        yield ChunkEvent::reasoning(text, false);
                    }
                    if let Some(signature) = delta.reasoning_signature {
                        hop_signature.push_str(&signature);
                    }
                    if delta.reasoning_done && reasoning_open {
                        reasoning_open = false;
                        yield ChunkEvent::reasoning("", true);
                    }

                    // Text arriving with a finish and no calls is the terminal text.
                    let terminal_here = delta.finish.is_some()
                        && delta.tool_calls.is_empty()
                        && ctx.tool_calls.is_empty();
                    if let Some(text) = delta.content.filter(|t| !t.is_empty()) {
                        if reasoning_open {
                            reasoning_open = false;
                            yield ChunkEvent::reasoning("", true);
                        }
                        hop_text.push_str(&text);
                        if terminal_here {
                            final_text = text;
                        } else {
                            yield ChunkEvent::content(text, false);
                        }
                    }

                    for fragment in delta.tool_calls {
                        ctx.tool_calls.apply(fragment);
                    }
                    if delta.usage.is_some() {
                        hop_usage = delta.usage;
                    }
                    if delta.finish.is_some() {
                        finish = delta.finish;
                    }
                }
            }

            if reasoning_open {
                yield ChunkEvent::reasoning("", true);
            }
            let Some(finish) = finish else {
                Err::<(), _>(RuntimeError::IncompleteStream { hop })?;
                return;
            };
            accumulate_usage(&mut total, hop_usage.as_ref(), track);

            let calls = ctx.tool_calls.take();
            if calls.is_empty() {
                debug!(hop, ?finish, "turn finished");
                yield ChunkEvent::content(final_text, true);
                if let Some(usage) = total {
                    yield ChunkEvent::Usage(usage);
                }
                ctx.completed = true;
                info!(hops = hop, "streaming turn complete");
                break;
            }

            if hop >= max_hops {
                Err::<(), _>(RuntimeError::ToolLoopExceeded { limit: max_hops })?;
            }

            let mut executed = Vec::with_capacity(calls.len());
            for mut call in calls {
                ensure_live(&cancel)?;
                yield ChunkEvent::ToolStatus { name: call.name.clone(), phase: ToolPhase::Preparing };
                let params = parse_call_arguments(&call)?;
                yield ChunkEvent::ToolStatus { name: call.name.clone(), phase: ToolPhase::Running };
                let result = invoke_call(registry.as_ref(), &call, params.clone()).await?;
                yield ChunkEvent::ToolResult {
                    name: call.name.clone(),
                    params,
                    result: result.clone(),
                };
                call.result = Some(result);
                executed.push(call);
            }
            let reasoning = ReasoningBlock::signed(hop_reasoning, Some(hop_signature));
            fold_into_thread(&mut ctx.thread, &hop_text, reasoning, &executed);
            hop += 1;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
