//! Per-turn streaming state.

use std::mem;

use parley_core::ids::new_tool_call_id;
use parley_core::options::CompletionOptions;
use parley_core::thread::ConversationThread;
use parley_core::tools::ToolCallRecord;
use parley_llm::{BackendRequest, ToolCallDelta};

/// Assembles streamed tool-call fragments into [`ToolCallRecord`]s.
///
/// A fragment with an id extends the call with that id, or opens a new one.
/// A fragment without an id extends the most recently opened call.
#[derive(Clone, Debug, Default)]
pub struct ToolCallAccumulator {
    calls: Vec<ToolCallRecord>,
}

impl ToolCallAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one fragment in.
    pub fn apply(&mut self, delta: ToolCallDelta) {
        let ToolCallDelta { id, name, arguments } = delta;
        let target = match id {
            Some(id) => match self.calls.iter().position(|c| c.id == id) {
                Some(pos) => pos,
                None => self.open(id),
            },
            None if self.calls.is_empty() => self.open(new_tool_call_id()),
            None => self.calls.len() - 1,
        };
        let call = &mut self.calls[target];
        if let Some(name) = name.filter(|n| !n.is_empty() && call.name.is_empty()) {
            call.name = name;
        }
        call.arguments.push_str(&arguments);
    }

    fn open(&mut self, id: String) -> usize {
        self.calls.push(ToolCallRecord::new(id, String::new(), String::new()));
        self.calls.len() - 1
    }

    /// Calls assembled so far, in the order they were opened.
    pub fn calls(&self) -> &[ToolCallRecord] {
        &self.calls
    }

    /// Number of open calls.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether no call has been opened.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Drain the assembled calls.
    pub fn take(&mut self) -> Vec<ToolCallRecord> {
        mem::take(&mut self.calls)
    }

    /// Discard everything.
    pub fn reset(&mut self) {
        self.calls.clear();
    }
}

/// State owned by one in-flight streaming turn.
#[derive(Debug)]
pub struct StreamingContext {
    /// Effective model.
    pub model: String,
    /// Request behind the currently open backend stream.
    pub request: Option<BackendRequest>,
    /// Working thread; grows by tool round trips only.
    pub thread: ConversationThread,
    /// Tool calls of the current backend call attempt.
    pub tool_calls: ToolCallAccumulator,
    /// Options for every hop of the turn.
    pub options: CompletionOptions,
    /// Set once the terminal event has been produced.
    pub completed: bool,
}

impl StreamingContext {
    /// Create the context for a turn.
    pub fn new(model: impl Into<String>, thread: ConversationThread, options: CompletionOptions) -> Self {
        Self {
            model: model.into(),
            request: None,
            thread,
            tool_calls: ToolCallAccumulator::new(),
            options,
            completed: false,
        }
    }

    /// Record a newly issued request; the accumulator starts empty.
    pub fn begin_attempt(&mut self, request: BackendRequest) {
        self.tool_calls.reset();
        self.request = Some(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frag(id: Option<&str>, name: Option<&str>, args: &str) -> ToolCallDelta {
        ToolCallDelta {
            id: id.map(String::from),
            name: name.map(String::from),
            arguments: args.into(),
        }
    }

    #[test]
    fn fragments_without_id_extend_latest_call() {
        let mut acc = ToolCallAccumulator::new();
        acc.apply(frag(Some("call_a"), Some("get_weather"), ""));
        acc.apply(frag(None, None, "{\"city\":"));
        acc.apply(frag(None, None, "\"Lyon\"}"));
        acc.apply(frag(Some("call_b"), Some("get_time"), "{}"));
        let calls = acc.take();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].arguments, r#"{"city":"Lyon"}"#);
        assert_eq!(calls[1].name, "get_time");
        assert!(acc.is_empty());
    }

    #[test]
    fn fragments_repeating_id_match_by_id() {
        let mut acc = ToolCallAccumulator::new();
        acc.apply(frag(Some("a"), Some("f"), "{\"x\""));
        acc.apply(frag(Some("b"), Some("g"), "{}"));
        acc.apply(frag(Some("a"), None, ":1}"));
        assert_eq!(acc.calls()[0].arguments, r#"{"x":1}"#);
        assert_eq!(acc.calls()[1].arguments, "{}");
    }

    #[test]
    fn orphan_fragment_gets_generated_id() {
        let mut acc = ToolCallAccumulator::new();
        acc.apply(frag(None, Some("f"), "{}"));
        assert!(acc.calls()[0].id.starts_with("call_"));
        assert_eq!(acc.calls()[0].name, "f");
    }

    #[test]
    fn begin_attempt_clears_calls() {
        let mut ctx = StreamingContext::new("m", ConversationThread::new(), CompletionOptions::default());
        ctx.tool_calls.apply(frag(Some("a"), Some("f"), "{}"));
        ctx.begin_attempt(BackendRequest {
            model: "m".into(),
            body: serde_json::json!({}),
            stream: true,
        });
        assert_eq!(ctx.tool_calls.len(), 0);
        assert!(ctx.request.is_some());
    }

    proptest! {
        #[test]
        fn ids_unique_within_attempt(ids in proptest::collection::vec(0u8..5, 1..30)) {
            let mut acc = ToolCallAccumulator::new();
            for id in &ids {
                acc.apply(frag(Some(&format!("call_{id}")), Some("f"), "x"));
            }
            let mut seen: Vec<&str> = acc.calls().iter().map(|c| c.id.as_str()).collect();
            let total = seen.len();
            seen.sort_unstable();
            seen.dedup();
            prop_assert_eq!(seen.len(), total);
            let fragments: usize = acc.calls().iter().map(|c| c.arguments.len()).sum();
            prop_assert_eq!(fragments, ids.len());
        }
    }
}
