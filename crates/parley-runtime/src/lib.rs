//! # parley-runtime
//!
//! Drives one completion turn end to end.
//!
//! - [`tool_loop`]: the single-shot tool execution loop
//! - [`stream_producer`]: the streaming equivalent, yielding [`ChunkEvent`]s
//!   and switching backend streams across tool round trips
//! - [`Completer`]: the caller-facing `complete` / `stream` API
//! - [`factory`]: settings-driven adapter construction
//!
//! [`ChunkEvent`]: parley_core::ChunkEvent

#![deny(unsafe_code)]

pub mod client;
pub mod context;
pub mod errors;
pub mod factory;
pub mod stream_producer;
pub mod tool_executor;
pub mod tool_loop;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{Completer, CompletionResult};
pub use context::{StreamingContext, ToolCallAccumulator};
pub use errors::RuntimeError;
pub use stream_producer::ChunkEventStream;
pub use tool_executor::ToolEventSink;
