//! Tool declaration policy.

use parley_core::options::CompletionOptions;
use parley_core::tools::ToolDefinition;

use crate::capabilities::CapabilityMatrix;

/// Whether a request for `model` should carry tool declarations.
///
/// All three must hold: the caller's [`ToolsMode`](parley_core::ToolsMode)
/// asks for tools, the model supports them, and at least one tool is
/// registered.
pub fn should_declare_tools(
    caps: &dyn CapabilityMatrix,
    model: &str,
    options: &CompletionOptions,
    tools: &[ToolDefinition],
) -> bool {
    options.tools_requested() && caps.supports_tools(model) && !tools.is_empty()
}
