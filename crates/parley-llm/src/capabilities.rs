//! # Capability Matrix
//!
//! Pure predicates mapping a model identifier to the feature flags that gate
//! request construction. Every method has a default, so
//! [`DefaultCapabilities`] is the shared table and each backend overrides only
//! the flags whose naming rules differ.

use serde::{Deserialize, Serialize};

/// What to do with system messages when a model has no system role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemFallback {
    /// Remove system messages from the payload.
    Drop,
    /// Re-label system messages as user messages.
    #[default]
    DemoteToUser,
}

/// Per-model feature flags.
///
/// Implementations must be side-effect free and deterministic.
pub trait CapabilityMatrix: Send + Sync {
    /// Whether the model accepts a system role.
    fn accepts_system_role(&self, _model: &str) -> bool {
        true
    }

    /// Whether the model supports function calling.
    fn supports_tools(&self, _model: &str) -> bool {
        true
    }

    /// Whether the model accepts image input.
    fn supports_vision(&self, _model: &str) -> bool {
        false
    }

    /// Whether `temperature` may be sent.
    fn supports_temperature(&self, _model: &str) -> bool {
        true
    }

    /// Whether `top_p` may be sent.
    fn supports_top_p(&self, _model: &str) -> bool {
        true
    }

    /// Whether `top_k` may be sent.
    fn supports_top_k(&self, _model: &str) -> bool {
        false
    }

    /// Whether a reasoning-effort parameter may be sent.
    fn supports_reasoning_effort(&self, _model: &str) -> bool {
        false
    }

    /// Whether an output token cap may be sent.
    fn supports_max_tokens(&self, _model: &str) -> bool {
        true
    }

    /// Handling of system messages for models without a system role.
    fn system_fallback(&self) -> SystemFallback {
        SystemFallback::DemoteToUser
    }

    /// Vision-capable models to fall back to, most preferred first.
    fn vision_fallbacks(&self) -> &[&'static str] {
        &[]
    }

    /// Collect every flag for `model`.
    fn snapshot(&self, model: &str) -> ModelCapabilities {
        ModelCapabilities {
            model: model.to_string(),
            accepts_system_role: self.accepts_system_role(model),
            supports_tools: self.supports_tools(model),
            supports_vision: self.supports_vision(model),
            supports_temperature: self.supports_temperature(model),
            supports_top_p: self.supports_top_p(model),
            supports_top_k: self.supports_top_k(model),
            supports_reasoning_effort: self.supports_reasoning_effort(model),
            supports_max_tokens: self.supports_max_tokens(model),
        }
    }
}

/// The shared default table.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCapabilities;

impl CapabilityMatrix for DefaultCapabilities {}

/// Snapshot of every capability flag for one model.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCapabilities {
    /// Model identifier.
    pub model: String,
    /// System role accepted.
    pub accepts_system_role: bool,
    /// Function calling.
    pub supports_tools: bool,
    /// Image input.
    pub supports_vision: bool,
    /// `temperature`.
    pub supports_temperature: bool,
    /// `top_p`.
    pub supports_top_p: bool,
    /// `top_k`.
    pub supports_top_k: bool,
    /// Reasoning effort.
    pub supports_reasoning_effort: bool,
    /// Output token cap.
    pub supports_max_tokens: bool,
}
