//! Message types for the vendor-neutral conversation model.
//!
//! A [`Message`] carries a role, plain text, at most one [`Attachment`], and
//! the bookkeeping needed to replay tool exchanges to any backend: assistant
//! messages list the tool calls they announced, tool messages name the call
//! they answer.

use std::fmt;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::tools::ToolCallRecord;

// ─────────────────────────────────────────────────────────────────────────────
// Role
// ─────────────────────────────────────────────────────────────────────────────

/// Author of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
    /// Result of a tool invocation.
    Tool,
}

impl Role {
    /// Wire label for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Attachments
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of payload attached to a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Image data (requires a vision-capable model).
    Image,
    /// Text document inlined as extra content.
    Text,
}

/// Raw attachment payload, either bytes or an already-encoded base64 string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "data", rename_all = "lowercase")]
pub enum AttachmentData {
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Standard base64 (no data-URL prefix).
    Base64(String),
}

/// A file attached to a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Image or text.
    pub kind: AttachmentKind,
    /// MIME type (e.g. `image/png`, `text/markdown`).
    pub mime_type: String,
    /// Raw payload.
    pub data: AttachmentData,
}

impl Attachment {
    /// Create an image attachment from raw bytes.
    #[must_use]
    pub fn image(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            kind: AttachmentKind::Image,
            mime_type: mime_type.into(),
            data: AttachmentData::Bytes(bytes),
        }
    }

    /// Create a text attachment.
    #[must_use]
    pub fn text(mime_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Text,
            mime_type: mime_type.into(),
            data: AttachmentData::Bytes(text.into().into_bytes()),
        }
    }

    /// Whether this attachment needs a vision-capable model.
    pub fn is_image(&self) -> bool {
        self.kind == AttachmentKind::Image
    }

    /// Payload as standard base64.
    pub fn to_base64(&self) -> String {
        match &self.data {
            AttachmentData::Bytes(bytes) => base64::engine::general_purpose::STANDARD.encode(bytes),
            AttachmentData::Base64(encoded) => encoded.clone(),
        }
    }

    /// Payload decoded as UTF-8 text (lossy).
    ///
    /// Base64 payloads that fail to decode are returned verbatim.
    pub fn to_text(&self) -> String {
        match &self.data {
            AttachmentData::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            AttachmentData::Base64(encoded) => base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_or_else(
                    |_| encoded.clone(),
                    |bytes| String::from_utf8_lossy(&bytes).into_owned(),
                ),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reasoning
// ─────────────────────────────────────────────────────────────────────────────

/// Signed reasoning produced alongside an assistant message.
///
/// Backends that verify their own reasoning on replay (Anthropic extended
/// thinking) require the block back verbatim, signature included. Unsigned
/// reasoning is display-only and is never stored here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningBlock {
    /// Reasoning text exactly as the backend produced it.
    pub text: String,
    /// Opaque backend signature.
    pub signature: String,
}

impl ReasoningBlock {
    /// Pair reasoning text with its signature; `None` without a signature.
    pub fn signed(text: impl Into<String>, signature: Option<String>) -> Option<Self> {
        signature.filter(|s| !s.is_empty()).map(|signature| Self {
            text: text.into(),
            signature,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Message
// ─────────────────────────────────────────────────────────────────────────────

/// One entry in a [`ConversationThread`](crate::thread::ConversationThread).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Author.
    pub role: Role,
    /// Text content.
    pub content: String,
    /// Optional single attachment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    /// Tool calls announced by an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRecord>,
    /// For tool messages: the call this result answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For tool messages: the tool name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Signed reasoning that preceded an assistant message's tool calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningBlock>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            attachment: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
            reasoning: None,
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an assistant message announcing tool calls.
    ///
    /// Results are stripped from the announced records; they travel in the
    /// matching tool messages instead.
    #[must_use]
    pub fn assistant_tool_calls(content: impl Into<String>, calls: &[ToolCallRecord]) -> Self {
        let mut msg = Self::new(Role::Assistant, content);
        msg.tool_calls = calls
            .iter()
            .map(|c| ToolCallRecord {
                result: None,
                ..c.clone()
            })
            .collect();
        msg
    }

    /// Create a tool-result message answering `call`.
    #[must_use]
    pub fn tool_result(call: &ToolCallRecord, content: impl Into<String>) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.tool_call_id = Some(call.id.clone());
        msg.name = Some(call.name.clone());
        msg
    }

    /// Attach signed reasoning to an assistant message.
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: Option<ReasoningBlock>) -> Self {
        self.reasoning = reasoning;
        self
    }

    /// Attach a payload to this message.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Whether the message carries an image attachment.
    pub fn has_image(&self) -> bool {
        self.attachment.as_ref().is_some_and(Attachment::is_image)
    }

    /// Flattened text sent to backends that only accept strings.
    ///
    /// Text attachments are appended after the message body, separated by a
    /// blank line. Image attachments do not contribute.
    pub fn content_for_model(&self) -> String {
        match &self.attachment {
            Some(att) if att.kind == AttachmentKind::Text => {
                let text = att.to_text();
                if self.content.is_empty() {
                    text
                } else {
                    format!("{}\n\n{text}", self.content)
                }
            }
            _ => self.content.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
