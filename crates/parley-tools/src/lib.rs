//! # parley-tools
//!
//! The tool registry the completion loop calls into.
//!
//! - [`ToolRegistry`]: `list()` declarations, `invoke(name, args)` by name
//! - [`Tool`]: one invocable tool with its declaration
//! - [`StaticToolRegistry`]: in-memory registry built at startup
//! - [`ToolError`]: per-call failures, with [`ToolError::is_fatal`] marking
//!   the ones that must abort the turn

#![deny(unsafe_code)]

pub mod errors;
pub mod registry;
pub mod traits;

pub use errors::ToolError;
pub use registry::StaticToolRegistry;
pub use traits::{FnTool, Tool, ToolRegistry};
