//! Append-only conversation thread.

use serde::{Deserialize, Serialize};

use crate::messages::{Message, Role};

/// Ordered messages for one turn.
///
/// Messages can be appended but never reordered, edited or removed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationThread {
    messages: Vec<Message>,
}

impl ConversationThread {
    /// Create an empty thread.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Builder-style append.
    #[must_use]
    pub fn with(mut self, message: Message) -> Self {
        self.push(message);
        self
    }

    /// Messages in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Iterate messages in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the thread has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether any message carries an image attachment.
    pub fn has_image_attachment(&self) -> bool {
        self.messages.iter().any(Message::has_image)
    }

    /// Whether any message has the system role.
    pub fn has_system_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::System)
    }
}

impl From<Vec<Message>> for ConversationThread {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl<'a> IntoIterator for &'a ConversationThread {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
