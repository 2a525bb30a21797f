//! Tool executor: parse arguments → invoke registry → fold into thread.
//!
//! Shared by the single-shot loop and the stream producer. Calls run one at a
//! time in backend order.

use parley_core::events::{ChunkEvent, ToolPhase};
use parley_core::messages::{Message, ReasoningBlock};
use parley_core::thread::ConversationThread;
use parley_core::tools::ToolCallRecord;
use parley_llm::parse_tool_arguments;
use parley_tools::ToolRegistry;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument, warn};

use crate::errors::RuntimeError;

/// Receiver side of tool progress for single-shot turns.
pub type ToolEventSink = UnboundedSender<ChunkEvent>;

fn notify(sink: Option<&ToolEventSink>, event: ChunkEvent) {
    if let Some(tx) = sink {
        // A dropped receiver only means nobody is watching.
        let _ = tx.send(event);
    }
}

/// Parse a call's serialized arguments.
///
/// A failure aborts the turn; it is never retried.
pub fn parse_call_arguments(call: &ToolCallRecord) -> Result<Value, RuntimeError> {
    parse_tool_arguments(&call.arguments).map_err(|source| {
        warn!(tool_name = %call.name, call_id = %call.id, error = %source, "tool arguments failed to parse");
        RuntimeError::InvalidToolArguments {
            tool_name: call.name.clone(),
            call_id: call.id.clone(),
            source,
        }
    })
}

/// Invoke one call through the registry.
///
/// Recoverable failures become `{"error": "<message>"}` so the model can
/// react; fatal registry failures abort the turn.
#[instrument(skip_all, fields(tool_name = %call.name, call_id = %call.id))]
pub async fn invoke_call(
    registry: &dyn ToolRegistry,
    call: &ToolCallRecord,
    args: Value,
) -> Result<Value, RuntimeError> {
    match registry.invoke(&call.name, args).await {
        Ok(result) => {
            debug!("tool completed");
            Ok(result)
        }
        Err(source) if source.is_fatal() => Err(RuntimeError::ToolRegistry {
            tool_name: call.name.clone(),
            source,
        }),
        Err(e) => {
            warn!(error = %e, "tool failed, reporting error to model");
            Ok(json!({"error": e.to_string()}))
        }
    }
}

/// Run every call in order and return them with results filled in.
///
/// With a sink, each call reports `preparing`, `running`, then its result.
pub async fn execute_calls(
    registry: &dyn ToolRegistry,
    calls: Vec<ToolCallRecord>,
    sink: Option<&ToolEventSink>,
) -> Result<Vec<ToolCallRecord>, RuntimeError> {
    let mut executed = Vec::with_capacity(calls.len());
    for mut call in calls {
        notify(sink, ChunkEvent::ToolStatus { name: call.name.clone(), phase: ToolPhase::Preparing });
        let params = parse_call_arguments(&call)?;
        notify(sink, ChunkEvent::ToolStatus { name: call.name.clone(), phase: ToolPhase::Running });
        let result = invoke_call(registry, &call, params.clone()).await?;
        notify(
            sink,
            ChunkEvent::ToolResult {
                name: call.name.clone(),
                params,
                result: result.clone(),
            },
        );
        call.result = Some(result);
        executed.push(call);
    }
    Ok(executed)
}

/// Append one round trip to the thread: the assistant announcement (with
/// any signed reasoning), then one tool message per call.
pub fn fold_into_thread(
    thread: &mut ConversationThread,
    text: &str,
    reasoning: Option<ReasoningBlock>,
    executed: &[ToolCallRecord],
) {
    thread.push(Message::assistant_tool_calls(text, executed).with_reasoning(reasoning));
    for call in executed {
        let content = call.result.as_ref().map(result_content).unwrap_or_default();
        thread.push(Message::tool_result(call, content));
    }
}

/// Tool message text for a result: strings verbatim, anything else as JSON.
pub fn result_content(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
