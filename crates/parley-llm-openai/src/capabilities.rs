//! `OpenAI` model capability table.

use parley_llm::CapabilityMatrix;

/// Vision-capable models used when a thread needs image input.
const VISION_FALLBACKS: &[&str] = &["gpt-4o", "gpt-4o-mini"];

/// Whether `model` is an O-series reasoning model (`o` followed by a digit).
pub fn is_reasoning_model(model: &str) -> bool {
    let mut chars = model.chars();
    chars.next() == Some('o') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// First-generation reasoning previews with no system role and no tools.
fn is_legacy_reasoning_model(model: &str) -> bool {
    model.starts_with("o1-mini") || model.starts_with("o1-preview")
}

/// Capability table for `OpenAI` models.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenAiCapabilities;

impl CapabilityMatrix for OpenAiCapabilities {
    fn accepts_system_role(&self, model: &str) -> bool {
        !is_legacy_reasoning_model(model)
    }

    fn supports_tools(&self, model: &str) -> bool {
        !is_legacy_reasoning_model(model)
    }

    fn supports_vision(&self, model: &str) -> bool {
        if is_reasoning_model(model) {
            return !is_legacy_reasoning_model(model) && !model.starts_with("o3-mini");
        }
        model.starts_with("gpt-4o")
            || model.starts_with("gpt-4.1")
            || model.starts_with("gpt-4-turbo")
            || model.contains("vision")
    }

    fn supports_temperature(&self, model: &str) -> bool {
        !is_reasoning_model(model)
    }

    fn supports_top_p(&self, model: &str) -> bool {
        !is_reasoning_model(model)
    }

    fn supports_reasoning_effort(&self, model: &str) -> bool {
        is_reasoning_model(model)
    }

    fn vision_fallbacks(&self) -> &[&'static str] {
        VISION_FALLBACKS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_llm::SystemFallback;

    #[test]
    fn reasoning_prefix() {
        assert!(is_reasoning_model("o1"));
        assert!(is_reasoning_model("o3-mini"));
        assert!(is_reasoning_model("o4-mini-2025-04-16"));
        assert!(!is_reasoning_model("gpt-4o"));
        assert!(!is_reasoning_model("omni-moderation-latest"));
        assert!(!is_reasoning_model(""));
    }

    #[test]
    fn legacy_reasoning_models_lack_system_and_tools() {
        let caps = OpenAiCapabilities;
        for model in ["o1-mini", "o1-preview-2024-09-12"] {
            assert!(!caps.accepts_system_role(model), "{model}");
            assert!(!caps.supports_tools(model), "{model}");
        }
        assert!(caps.accepts_system_role("o1"));
        assert!(caps.supports_tools("o3-mini"));
        assert_eq!(caps.system_fallback(), SystemFallback::DemoteToUser);
    }

    #[test]
    fn reasoning_models_drop_sampling() {
        let caps = OpenAiCapabilities.snapshot("o3-mini");
        assert!(!caps.supports_temperature);
        assert!(!caps.supports_top_p);
        assert!(!caps.supports_top_k);
        assert!(caps.supports_reasoning_effort);
        assert!(caps.supports_max_tokens);
    }

    #[test]
    fn chat_models_keep_sampling() {
        let caps = OpenAiCapabilities.snapshot("gpt-4o-mini");
        assert!(caps.supports_temperature);
        assert!(caps.supports_top_p);
        assert!(!caps.supports_top_k);
        assert!(!caps.supports_reasoning_effort);
    }

    #[test]
    fn vision_table() {
        let caps = OpenAiCapabilities;
        assert!(caps.supports_vision("gpt-4o"));
        assert!(caps.supports_vision("gpt-4.1-mini"));
        assert!(caps.supports_vision("o1"));
        assert!(!caps.supports_vision("o1-mini"));
        assert!(!caps.supports_vision("o3-mini"));
        assert!(!caps.supports_vision("gpt-3.5-turbo"));
        assert!(VISION_FALLBACKS.iter().all(|m| caps.supports_vision(m)));
    }
}
