//! Completion options recognized by every backend.
//!
//! Options a selected model does not support are silently omitted by the
//! adapter when it builds the request; they are never an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether tool declarations are sent with a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolsMode {
    /// Declare registered tools when the model supports them.
    #[default]
    Enabled,
    /// Never declare tools.
    Disabled,
    /// Declare tools only when `top_k` is set.
    ///
    /// Legacy coupling kept for callers that relied on it.
    Auto,
}

/// Requested reasoning depth for models that expose one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    /// Minimal reasoning.
    Low,
    /// Balanced reasoning.
    Medium,
    /// Maximum reasoning.
    High,
}

impl ReasoningEffort {
    /// Wire label (`low`, `medium`, `high`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Per-call completion options.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    /// Output token cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Tool declaration policy.
    #[serde(default)]
    pub tools_enabled: ToolsMode,
    /// Reasoning depth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Report token usage.
    #[serde(default)]
    pub track_usage: bool,
    /// Backend passthrough, merged shallowly into the request body last.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom_overrides: Map<String, Value>,
}

impl CompletionOptions {
    /// Create default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output token cap.
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set nucleus sampling.
    #[must_use]
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set top-k sampling.
    #[must_use]
    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Set the tool declaration policy.
    #[must_use]
    pub fn tools(mut self, mode: ToolsMode) -> Self {
        self.tools_enabled = mode;
        self
    }

    /// Set the reasoning depth.
    #[must_use]
    pub fn reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }

    /// Enable or disable usage reporting.
    #[must_use]
    pub fn track_usage(mut self, track: bool) -> Self {
        self.track_usage = track;
        self
    }

    /// Add one passthrough field.
    #[must_use]
    pub fn custom_override(mut self, key: impl Into<String>, value: Value) -> Self {
        let _ = self.custom_overrides.insert(key.into(), value);
        self
    }

    /// Whether the caller's policy asks for tools on this request.
    ///
    /// Model support and registry contents are checked separately.
    pub fn tools_requested(&self) -> bool {
        match self.tools_enabled {
            ToolsMode::Enabled => true,
            ToolsMode::Disabled => false,
            ToolsMode::Auto => self.top_k.is_some(),
        }
    }
}
