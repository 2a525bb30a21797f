//! # parley-llm
//!
//! Backend adapter abstraction and the utilities every adapter shares.
//!
//! - [`CapabilityMatrix`]: per-model feature flags, with a shared default table
//! - [`build_payload`]: thread + options to ordered, backend-neutral units
//! - [`VendorAdapter`]: request building, single-shot and streaming calls,
//!   native chunk translation into [`StreamDelta`]s
//! - [`BackendTransport`] / [`HttpTransport`]: the HTTP + SSE collaborator
//! - Tool schema normalization, strict tool-argument parsing, and the
//!   tool-declaration policy

#![deny(unsafe_code)]

pub mod adapter;
pub mod capabilities;
pub mod error;
pub mod error_parsing;
pub mod payload;
pub mod schema;
pub mod sse;
pub mod tool_parsing;
pub mod tool_policy;
pub mod transport;

pub use adapter::{
    BackendRequest, BackendResponse, BlockKind, ChunkState, FinishReason, NativeChunkStream,
    StreamDelta, ToolCallDelta, VendorAdapter, merge_overrides,
};
pub use capabilities::{CapabilityMatrix, DefaultCapabilities, ModelCapabilities, SystemFallback};
pub use error::{ProviderError, ProviderResult};
pub use error_parsing::{ApiErrorInfo, parse_api_error};
pub use payload::{PayloadPart, PayloadUnit, build_payload};
pub use schema::normalize_schema;
pub use sse::{extract_sse_data, parse_sse_lines};
pub use tool_parsing::{ToolArgumentError, parse_tool_arguments};
pub use tool_policy::should_declare_tools;
pub use transport::{BackendTransport, HttpTransport, HttpTransportConfig};
