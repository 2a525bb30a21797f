//! Runtime error types.

use parley_llm::{ProviderError, ToolArgumentError};
use parley_tools::ToolError;

/// Errors that abort a turn.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Backend, transport or translation failure.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A tool call's arguments could not be parsed.
    #[error("Invalid arguments for tool {tool_name} (call {call_id}): {source}")]
    InvalidToolArguments {
        /// Tool name.
        tool_name: String,
        /// Call id.
        call_id: String,
        /// Parse failure.
        #[source]
        source: ToolArgumentError,
    },

    /// The tool registry reported a non-recoverable fault.
    #[error("Tool registry failure in {tool_name}: {source}")]
    ToolRegistry {
        /// Tool being invoked.
        tool_name: String,
        /// Registry error.
        #[source]
        source: ToolError,
    },

    /// The backend kept requesting tools past the hop limit.
    #[error("Tool loop exceeded {limit} round trips")]
    ToolLoopExceeded {
        /// Configured limit.
        limit: u32,
    },

    /// A backend stream ended without a finish signal.
    #[error("Backend stream ended without a finish signal (hop {hop})")]
    IncompleteStream {
        /// Round trip on which the stream ended.
        hop: u32,
    },

    /// The caller cancelled the turn.
    #[error("Operation cancelled")]
    Cancelled,
}

impl RuntimeError {
    /// Whether retrying the whole turn may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::Cancelled | Self::IncompleteStream { .. } => true,
            Self::InvalidToolArguments { .. }
            | Self::ToolRegistry { .. }
            | Self::ToolLoopExceeded { .. } => false,
        }
    }

    /// Error category string for logs and callers.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Provider(_) => "provider",
            Self::InvalidToolArguments { .. } => "invalid_tool_arguments",
            Self::ToolRegistry { .. } => "tool_registry",
            Self::ToolLoopExceeded { .. } => "tool_loop_exceeded",
            Self::IncompleteStream { .. } => "incomplete_stream",
            Self::Cancelled => "cancelled",
        }
    }
}
