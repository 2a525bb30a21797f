//! Tool and registry traits.

use async_trait::async_trait;
use parley_core::tools::ToolDefinition;
use serde_json::Value;

use crate::errors::ToolError;

/// An invocable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declaration sent to the model. The name is the dispatch key.
    fn definition(&self) -> ToolDefinition;

    /// Run with parsed JSON arguments.
    async fn invoke(&self, args: Value) -> Result<Value, ToolError>;
}

/// Name-addressed set of tools, injected into the completion loop.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// Declarations of every registered tool.
    fn list(&self) -> Vec<ToolDefinition>;

    /// Invoke `name` with `args`.
    async fn invoke(&self, name: &str, args: Value) -> Result<Value, ToolError>;
}

/// A [`Tool`] backed by a synchronous closure.
pub struct FnTool<F> {
    definition: ToolDefinition,
    func: F,
}

impl<F> FnTool<F>
where
    F: Fn(Value) -> Result<Value, ToolError> + Send + Sync,
{
    /// Wrap `func` under `definition`.
    pub fn new(definition: ToolDefinition, func: F) -> Self {
        Self { definition, func }
    }
}

#[async_trait]
impl<F> Tool for FnTool<F>
where
    F: Fn(Value) -> Result<Value, ToolError> + Send + Sync,
{
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        (self.func)(args)
    }
}
