//! # parley-llm-anthropic
//!
//! Anthropic Messages adapter.
//!
//! - System messages travel in the top-level `system` field
//! - `max_tokens` is always sent (default 4096)
//! - Reasoning effort becomes an extended-thinking budget; sampling
//!   parameters are omitted while thinking is on
//! - Consecutive tool results share one `user` message of `tool_result` blocks
//! - Legacy `claude-instant` / `claude-2` models get no system role, tools or
//!   images

#![deny(unsafe_code)]

pub mod adapter;
pub mod capabilities;
pub mod message_converter;
pub mod stream_handler;
pub mod types;

pub use adapter::{AnthropicAdapter, MESSAGES_PATH};
pub use capabilities::{AnthropicCapabilities, thinking_budget};
