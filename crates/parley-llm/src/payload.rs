//! # Payload Builder
//!
//! Converts a [`ConversationThread`] into ordered, backend-neutral
//! [`PayloadUnit`]s, applying capability decisions:
//!
//! - system messages for models without a system role are dropped or demoted
//!   to user, per [`CapabilityMatrix::system_fallback`]
//! - text attachments become an extra text part
//! - image attachments become an image part on vision-capable models and are
//!   omitted (with a warning) otherwise
//!
//! The source thread is never mutated.

use parley_core::messages::{AttachmentKind, Message, ReasoningBlock, Role};
use parley_core::thread::ConversationThread;
use parley_core::tools::ToolCallRecord;
use tracing::warn;

use crate::capabilities::{CapabilityMatrix, SystemFallback};

/// One piece of content inside a [`PayloadUnit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadPart {
    /// Plain text.
    Text(String),
    /// Inline image.
    Image {
        /// MIME type.
        mime_type: String,
        /// Standard base64 payload.
        data: String,
    },
}

/// One role-tagged message ready for an adapter to render.
#[derive(Clone, Debug, PartialEq)]
pub struct PayloadUnit {
    /// Effective role (after any system demotion).
    pub role: Role,
    /// Content parts, in order.
    pub parts: Vec<PayloadPart>,
    /// Tool calls announced by an assistant unit.
    pub tool_calls: Vec<ToolCallRecord>,
    /// For tool units: the call being answered.
    pub tool_call_id: Option<String>,
    /// For tool units: the tool name.
    pub name: Option<String>,
    /// Signed reasoning to replay ahead of an assistant unit's content.
    pub reasoning: Option<ReasoningBlock>,
}

impl PayloadUnit {
    /// Concatenated text parts, separated by blank lines.
    pub fn text(&self) -> String {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|p| match p {
                PayloadPart::Text(t) => Some(t.as_str()),
                PayloadPart::Image { .. } => None,
            })
            .collect();
        texts.join("\n\n")
    }

    /// Whether any part is an image.
    pub fn has_image(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, PayloadPart::Image { .. }))
    }
}

/// Build the neutral payload for `model`.
pub fn build_payload(
    thread: &ConversationThread,
    model: &str,
    caps: &dyn CapabilityMatrix,
) -> Vec<PayloadUnit> {
    let system_ok = caps.accepts_system_role(model);
    let vision_ok = caps.supports_vision(model);
    let fallback = caps.system_fallback();

    thread
        .iter()
        .filter_map(|msg| {
            let role = match msg.role {
                Role::System if !system_ok => match fallback {
                    SystemFallback::Drop => return None,
                    SystemFallback::DemoteToUser => Role::User,
                },
                role => role,
            };
            Some(to_unit(msg, role, model, vision_ok))
        })
        .collect()
}

fn to_unit(msg: &Message, role: Role, model: &str, vision_ok: bool) -> PayloadUnit {
    let mut parts = Vec::new();
    if !msg.content.is_empty() {
        parts.push(PayloadPart::Text(msg.content.clone()));
    }

    if let Some(att) = &msg.attachment {
        match att.kind {
            AttachmentKind::Text => parts.push(PayloadPart::Text(att.to_text())),
            AttachmentKind::Image if vision_ok => parts.push(PayloadPart::Image {
                mime_type: att.mime_type.clone(),
                data: att.to_base64(),
            }),
            AttachmentKind::Image => {
                warn!(model, mime_type = %att.mime_type, "model lacks vision, omitting image attachment");
            }
        }
    }

    if parts.is_empty() && msg.tool_calls.is_empty() {
        parts.push(PayloadPart::Text(String::new()));
    }

    PayloadUnit {
        role,
        parts,
        tool_calls: msg.tool_calls.clone(),
        tool_call_id: msg.tool_call_id.clone(),
        name: msg.name.clone(),
        reasoning: msg.reasoning.clone(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
