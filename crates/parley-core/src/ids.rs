//! Identifier helpers.
//!
//! Turn ids are UUID v7 (time-ordered) newtypes. Tool-call ids follow the
//! `call_<uuid>` convention most backends use, and are only synthesized when a
//! backend omits one.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one logical turn (one `complete` or `stream` call).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(String);

impl TurnId {
    /// Create a new time-ordered turn id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Return the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generate a tool-call id for a backend that did not supply one.
#[must_use]
pub fn new_tool_call_id() -> String {
    format!("call_{}", Uuid::now_v7().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_ids_are_unique() {
        assert_ne!(TurnId::new(), TurnId::new());
    }

    #[test]
    fn turn_id_serializes_transparently() {
        let id = TurnId::new();
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json, id.as_str());
    }

    #[test]
    fn tool_call_id_has_prefix() {
        let id = new_tool_call_id();
        assert!(id.starts_with("call_"));
        assert_eq!(id.len(), "call_".len() + 32);
        assert_ne!(id, new_tool_call_id());
    }
}
