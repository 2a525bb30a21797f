//! # parley-llm-openai
//!
//! `OpenAI` Chat Completions adapter.
//!
//! - O-series reasoning models (`o1`, `o3-mini`, ...) take no sampling
//!   parameters and use `max_completion_tokens`
//! - `o1-mini` / `o1-preview` have neither a system role nor tools
//! - Tool results render as one `tool` message per call
//! - Streaming asks for a trailing usage chunk when usage is tracked

#![deny(unsafe_code)]

pub mod adapter;
pub mod capabilities;
pub mod message_converter;
pub mod stream_handler;
pub mod types;

pub use adapter::{CHAT_COMPLETIONS_PATH, OpenAiAdapter};
pub use capabilities::{OpenAiCapabilities, is_reasoning_model};
