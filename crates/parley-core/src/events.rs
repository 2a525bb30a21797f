//! Uniform streaming event vocabulary.
//!
//! Every backend's native chunks are normalized into [`ChunkEvent`] before
//! they reach a caller. A turn that finishes without further tool round trips
//! ends with exactly one `Content { done: true }`, optionally followed by one
//! `Usage`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::usage::UsageStats;

/// Tool lifecycle phase reported through [`ChunkEvent::ToolStatus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolPhase {
    /// Arguments are being parsed.
    Preparing,
    /// The registry is executing the tool.
    Running,
}

/// One event of a streaming turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChunkEvent {
    /// Visible model output.
    Content {
        /// Text fragment (may be empty on the terminal event).
        text: String,
        /// Set once, on the terminal event.
        done: bool,
    },
    /// Reasoning output, when the backend exposes it.
    Reasoning {
        /// Text fragment.
        text: String,
        /// Whether the reasoning block is finished.
        done: bool,
    },
    /// Tool lifecycle update.
    #[serde(rename_all = "camelCase")]
    ToolStatus {
        /// Tool name.
        name: String,
        /// Phase.
        phase: ToolPhase,
    },
    /// A tool finished.
    ToolResult {
        /// Tool name.
        name: String,
        /// Parsed arguments.
        params: Value,
        /// Registry result, or an `{"error": ...}` object.
        result: Value,
    },
    /// The producer opened a new backend stream after tool execution.
    #[serde(rename_all = "camelCase")]
    StreamSwitch {
        /// Round-trip number of the new stream (1 for the first switch).
        hop: u32,
        /// Model the new stream was opened against.
        model: String,
    },
    /// Cumulative usage for the whole turn.
    Usage(UsageStats),
}

impl ChunkEvent {
    /// Create a content event.
    #[must_use]
    pub fn content(text: impl Into<String>, done: bool) -> Self {
        Self::Content {
            text: text.into(),
            done,
        }
    }

    /// Create a reasoning event.
    #[must_use]
    pub fn reasoning(text: impl Into<String>, done: bool) -> Self {
        Self::Reasoning {
            text: text.into(),
            done,
        }
    }

    /// Whether this is the terminal content event.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Content { done: true, .. })
    }

    /// Event type label, matching the serialized `type` tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Content { .. } => "content",
            Self::Reasoning { .. } => "reasoning",
            Self::ToolStatus { .. } => "toolStatus",
            Self::ToolResult { .. } => "toolResult",
            Self::StreamSwitch { .. } => "streamSwitch",
            Self::Usage(_) => "usage",
        }
    }
}
