//! Tool invocation errors.

/// Why a tool invocation failed.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No tool with this name is registered.
    #[error("tool not found: {name}")]
    NotFound {
        /// Requested tool name.
        name: String,
    },

    /// The tool ran and failed.
    #[error("{message}")]
    Execution {
        /// Failure description shown to the model.
        message: String,
    },

    /// The registry itself is broken; the turn cannot continue.
    #[error("tool registry failure: {message}")]
    Fatal {
        /// Failure description.
        message: String,
    },
}

impl ToolError {
    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Whether the failure must abort the turn instead of being reported to
    /// the model as the call's result.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}
