//! Anthropic model capability table.

use parley_core::options::ReasoningEffort;
use parley_llm::{CapabilityMatrix, SystemFallback};

/// Vision-capable models used when a thread needs image input.
const VISION_FALLBACKS: &[&str] = &["claude-sonnet-4-5", "claude-3-5-sonnet-latest"];

/// Pre-Claude-3 models: text-only, no tools, no system role.
fn is_legacy_model(model: &str) -> bool {
    model.starts_with("claude-instant") || model.starts_with("claude-2")
}

/// Models that accept an extended-thinking budget.
fn is_thinking_model(model: &str) -> bool {
    if model.starts_with("claude-3-7") {
        return true;
    }
    model.starts_with("claude-") && !model.starts_with("claude-3") && !is_legacy_model(model)
}

/// Extended-thinking budget (tokens) for a reasoning effort.
pub fn thinking_budget(effort: ReasoningEffort) -> u32 {
    match effort {
        ReasoningEffort::Low => 1024,
        ReasoningEffort::Medium => 4096,
        ReasoningEffort::High => 16_384,
    }
}

/// Capability table for Claude models.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnthropicCapabilities;

impl CapabilityMatrix for AnthropicCapabilities {
    fn accepts_system_role(&self, model: &str) -> bool {
        !is_legacy_model(model)
    }

    fn supports_tools(&self, model: &str) -> bool {
        !is_legacy_model(model)
    }

    fn supports_vision(&self, model: &str) -> bool {
        !is_legacy_model(model)
    }

    fn supports_top_k(&self, _model: &str) -> bool {
        true
    }

    fn supports_reasoning_effort(&self, model: &str) -> bool {
        is_thinking_model(model)
    }

    fn system_fallback(&self) -> SystemFallback {
        SystemFallback::Drop
    }

    fn vision_fallbacks(&self) -> &[&'static str] {
        VISION_FALLBACKS
    }
}
