//! In-memory tool registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parley_core::tools::ToolDefinition;
use serde_json::Value;
use tracing::debug;

use crate::errors::ToolError;
use crate::traits::{Tool, ToolRegistry};

/// Registry populated before the first turn and read-only afterwards.
#[derive(Default)]
pub struct StaticToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl StaticToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        debug!(tool_name = %name, "tool registered");
        let _ = self.tools.insert(name, tool);
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[async_trait]
impl ToolRegistry for StaticToolRegistry {
    /// Declarations sorted by name.
    fn list(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    async fn invoke(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::NotFound {
            name: name.to_string(),
        })?;
        tool.invoke(args).await
    }
}
