//! # parley-core
//!
//! Foundation types shared by every Parley crate.
//!
//! This crate provides the vendor-neutral vocabulary that adapters, the tool
//! loop and callers all speak:
//!
//! - **Messages**: [`Message`](messages::Message) with role, text, an optional
//!   [`Attachment`](messages::Attachment), and tool-call bookkeeping
//! - **Threads**: [`ConversationThread`](thread::ConversationThread), the
//!   append-only message sequence for one turn
//! - **Options**: [`CompletionOptions`](options::CompletionOptions) recognized
//!   by every backend
//! - **Events**: [`ChunkEvent`](events::ChunkEvent), the uniform streaming
//!   vocabulary
//! - **Usage**: [`UsageStats`](usage::UsageStats) with monotonic accumulation
//! - **Tools**: [`ToolDefinition`](tools::ToolDefinition) and
//!   [`ToolCallRecord`](tools::ToolCallRecord)

#![deny(unsafe_code)]

pub mod events;
pub mod ids;
pub mod logging;
pub mod messages;
pub mod options;
pub mod thread;
pub mod tools;
pub mod usage;

pub use events::{ChunkEvent, ToolPhase};
pub use messages::{Attachment, AttachmentData, AttachmentKind, Message, ReasoningBlock, Role};
pub use options::{CompletionOptions, ReasoningEffort, ToolsMode};
pub use thread::ConversationThread;
pub use tools::{ToolCallRecord, ToolDefinition};
pub use usage::{UsageDetails, UsageStats};
